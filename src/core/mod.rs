pub mod artifact;
pub mod discovery;
pub mod download;
pub mod installer;
pub mod mining;
pub mod nodeconf;
pub mod paths;
pub mod platform;
pub mod prefs;
pub mod process;
pub mod storage;
