pub(crate) mod anr;
pub(crate) mod bootstat;
pub(crate) mod bytescan;
pub(crate) mod databases;
pub(crate) mod dropbox;
pub(crate) mod kernel;
pub(crate) mod listing;
pub(crate) mod logcat;
pub(crate) mod packages;
pub(crate) mod prefs;
pub(crate) mod properties;
pub(crate) mod recovery;
pub(crate) mod tombstones;
pub(crate) mod usagestats;
