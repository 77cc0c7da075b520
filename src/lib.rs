// src/lib.rs
// CFS Reader Library - Public API

//! # CFS Reader
//!
//! A Rust library for reading CED CFS (CED Filing System) files, as written by
//! Signal and other CED electrophysiology software.
//!
//! ## Features
//!
//! - Decode file metadata, channel descriptors and file variables
//! - Read every frame (data section) with its frame variables
//! - Convert raw samples to physical units, including interleaved channels
//! - Skip Signal's internal bookkeeping variables (configurable)
//! - Export frame variables and signals to CSV
//!
//! ## Example
//!
//! ```no_run
//! use cfs_reader::CfsFile;
//!
//! let cfs = CfsFile::open("recording.cfs").expect("Failed to load file");
//!
//! println!("Channels: {}, frames: {}", cfs.n_channels(), cfs.n_frames());
//!
//! if let Some(frame) = cfs.frame(0) {
//!     let dt = frame.common_sample_interval(&["EMG", "Force"]).expect("Mismatched channels");
//!     if let Some(emg) = frame.data("EMG") {
//!         println!("First EMG sample: {} (dt = {} s)", emg[0], dt);
//!     }
//! }
//! ```

mod cfs;
mod error;
pub mod export;
mod frame;
mod header;
mod info;
pub mod primitive;
mod source;
pub mod structure;
mod variable;

pub use cfs::{CfsFile, ChannelUnits, DecodeOptions, SIGNAL_JUNK_PATTERNS};
pub use error::{CfsError, Result};
pub use frame::{ChannelInfo, DataSectionHeader, Frame, FrameChannel};
pub use header::{ChannelDescriptor, FileHeader, VariableDescriptor};
pub use info::{CfsInfo, CreationTime};
pub use variable::{Value, Variable};
