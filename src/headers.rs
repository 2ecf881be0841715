//! Standard SEG-Y binary and trace header short names
//!
//! Column `i` of a seismic trace-header matrix holds the field named
//! `TRACE_HEADER_NAMES[i]`; row `i` of the binary header holds
//! `BIN_HEADER_NAMES[i]`.

pub const BIN_HEADER_NAMES: [&str; 30] = [
    "JOB",
    "LINE",
    "REEL",
    "TRACENUM",
    "AUX",
    "SAMP_RATE",
    "SAMP_FRATE",
    "SAMP_NUM",
    "SAMP_FNUM",
    "FORMAT",
    "CDP_FOLD",
    "SORT",
    "VERT_SUM",
    "SWEEP_START",
    "SWEEP_END",
    "SWEEP_LENGTH",
    "SWEEP_TYPE",
    "SWEEP_CHAN",
    "SWEEP_TAPER_START",
    "SWEEP_TAPER_END",
    "SWEEP_TAPER_TYPE",
    "CORR",
    "BIN_GAIN",
    "AMP_REC",
    "LENGTH_SYS",
    "POLARITY",
    "VIB_POL",
    "REVISION",
    "FIXED_TRLENGTH",
    "N_EXT_HDRS",
];

pub const TRACE_HEADER_NAMES: [&str; 78] = [
    "SEQWL", "SEQWR", "FFID", "TRCFLD", "SP", "CDP", "TRCNUM", "TRCID", "NVST", "NHST", "DU",
    "DSREG", "RGE", "SES", "SDBS", "DERG", "DES", "WDS", "WGD", "SAED", "SAC", "SRCX", "SRCY",
    "GRPX", "GRPY", "UNITS", "WVEL", "SVEL", "UTSRC", "UTGRP", "SECSCOR", "GRPSCOR", "TSA",
    "LAGTA", "LAGTB", "DELRECT", "MTSTART", "MTEND", "NSMP", "SI", "GTFI", "IG", "IGC", "CORREL",
    "SFSTART", "SFEND", "SLEN", "STYP", "SSTRLS", "SSTLE", "TTYP", "AFF", "AFS", "NFF", "NFS",
    "LOCF", "HOCF", "LOCS", "HICS", "YEAR", "DAY", "HOUR", "MINUTE", "SCE", "TMBS", "TWF",
    "GGNSW", "GGN1ST", "GGNLST", "GAPSZ", "OAWT", "CDP_X", "CDP_Y", "INLINE", "XLINE", "SPN",
    "SPS", "TVMU",
];

/// Lines in a text header
pub const TEXT_HEADER_LINES: usize = 40;

/// Characters per text header line
pub const TEXT_HEADER_LINE_LEN: usize = 80;

/// Sample interval field of the binary header
pub const SAMPLE_RATE: &str = "SAMP_RATE";

/// Recording delay field of the trace header, the time of the first sample
pub const FIRST_SAMPLE: &str = "DELRECT";

pub fn bin_header_index(name: &str) -> Option<usize> {
    BIN_HEADER_NAMES.iter().position(|n| *n == name)
}

pub fn trace_header_index(name: &str) -> Option<usize> {
    TRACE_HEADER_NAMES.iter().position(|n| *n == name)
}
