//! Matroska element identifiers (IDs include the VINT marker).

/// Numeric element-type identifier.
pub type ElementId = u32;

// Segment info

pub const INFO: ElementId = 0x1549_A966;
pub const TIMESTAMP_SCALE: ElementId = 0x2A_D7B1;

// Tracks

pub const TRACKS: ElementId = 0x1654_AE6B;
pub const TRACK_ENTRY: ElementId = 0xAE;
pub const TRACK_NUMBER: ElementId = 0xD7;
pub const TRACK_UID: ElementId = 0x73C5;
pub const TRACK_TYPE: ElementId = 0x83;
pub const DEFAULT_DURATION: ElementId = 0x23_E383;
pub const CONTENT_ENCODINGS: ElementId = 0x6D80;
pub const CONTENT_ENCODING: ElementId = 0x6240;
pub const CONTENT_ENCODING_ORDER: ElementId = 0x5031;
pub const CONTENT_ENCODING_SCOPE: ElementId = 0x5032;
pub const CONTENT_ENCODING_TYPE: ElementId = 0x5033;
pub const CONTENT_COMPRESSION: ElementId = 0x5034;
pub const CONTENT_COMP_ALGO: ElementId = 0x4254;
pub const CONTENT_COMP_SETTINGS: ElementId = 0x4255;
pub const CONTENT_ENCRYPTION: ElementId = 0x5035;

// Chapters

pub const CHAPTERS: ElementId = 0x1043_A770;
pub const EDITION_ENTRY: ElementId = 0x45B9;
pub const EDITION_UID: ElementId = 0x45BC;
pub const EDITION_FLAG_HIDDEN: ElementId = 0x45BD;
pub const EDITION_FLAG_DEFAULT: ElementId = 0x45DB;
pub const EDITION_FLAG_ORDERED: ElementId = 0x45DD;
pub const CHAPTER_ATOM: ElementId = 0xB6;
pub const CHAPTER_UID: ElementId = 0x73C4;
pub const CHAPTER_STRING_UID: ElementId = 0x5654;
pub const CHAPTER_TIME_START: ElementId = 0x91;
pub const CHAPTER_TIME_END: ElementId = 0x92;
pub const CHAPTER_FLAG_HIDDEN: ElementId = 0x98;
pub const CHAPTER_FLAG_ENABLED: ElementId = 0x4598;
pub const CHAPTER_SEGMENT_UID: ElementId = 0x6E67;
pub const CHAPTER_SEGMENT_EDITION_UID: ElementId = 0x6EBC;
pub const CHAPTER_PHYSICAL_EQUIV: ElementId = 0x63C3;
pub const CHAPTER_TRACK: ElementId = 0x8F;
pub const CHAPTER_TRACK_NUMBER: ElementId = 0x89;
pub const CHAPTER_DISPLAY: ElementId = 0x80;
pub const CHAPTER_STRING: ElementId = 0x85;
pub const CHAPTER_LANGUAGE: ElementId = 0x437C;
pub const CHAPTER_LANGUAGE_IETF: ElementId = 0x437D;
pub const CHAPTER_COUNTRY: ElementId = 0x437E;

// Tags

pub const TAGS: ElementId = 0x1254_C367;
pub const TAG: ElementId = 0x7373;
pub const TAG_TARGETS: ElementId = 0x63C0;
pub const TAG_TARGET_TYPE_VALUE: ElementId = 0x68CA;
pub const TAG_TARGET_TYPE: ElementId = 0x63CA;
pub const TAG_TRACK_UID: ElementId = 0x63C5;
pub const TAG_EDITION_UID: ElementId = 0x63C9;
pub const TAG_CHAPTER_UID: ElementId = 0x63C4;
pub const TAG_ATTACHMENT_UID: ElementId = 0x63C6;
pub const SIMPLE_TAG: ElementId = 0x67C8;
pub const TAG_NAME: ElementId = 0x45A3;
pub const TAG_LANGUAGE: ElementId = 0x447A;
pub const TAG_LANGUAGE_IETF: ElementId = 0x447B;
pub const TAG_DEFAULT: ElementId = 0x4484;
pub const TAG_STRING: ElementId = 0x4487;
pub const TAG_BINARY: ElementId = 0x4485;
