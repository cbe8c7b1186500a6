//! Concurrent HeavyKeeper for finding the Top-K most frequent items of a stream
//! with bounded memory.
//!
//! This implementation is based on the paper HeavyKeeper: An Accurate Algorithm
//! for Finding Top-k Elephant Flows by Junzhi Gong, Tong Yang, Haowei Zhang, and
//! Hao Li, Peking University; Steve Uhlig, Queen Mary, University of London;
//! Shigang Chen, University of Florida; Lorna Uden, Staffordshire University;
//! Xiaoming Li, Peking University
//!
//! Updates are applied by a pool of worker threads sharing one sketch whose
//! buckets are locked individually, so ingestion scales with the number of
//! workers. Results are approximate; call [`TopK::drain`] before reading them.

mod heavykeeper;
pub use heavykeeper::TopK;

mod config;
pub use config::Config;

mod error;
pub use error::TopKError;

mod priority_queue;
pub use priority_queue::Node;

mod decay;
mod engine;
mod hashing;
mod sketch;
