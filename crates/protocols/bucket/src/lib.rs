//! Bucket Protocol Implementation
//!
//! Client for Bucket, a CDP stablecoin protocol (BUCK) on Sui.
//!
//! # Protocol Overview
//!
//! - Bottle: a user's collateralized debt position
//! - Bucket: the vault holding one collateral type
//! - Tank: stability pool absorbing liquidated debt
//! - Well: BKT staking pool
//!
//! # Features
//!
//! - Move call builders producing unsigned programmable transactions
//! - State readers for buckets, tanks, bottles, prices and constants
//! - Liquid staking yields
//!
//! # Example
//!
//! ```ignore
//! use bucket::BucketClient;
//!
//! let client = BucketClient::new(Arc::new(rpc), Network::Mainnet)?;
//! let buckets = client.get_all_buckets().await?;
//! println!("{} buckets", buckets.len());
//! ```

pub mod apy;
pub mod client;
pub mod constants;
pub mod fetch;
pub mod state;
pub mod tx_builder;

pub use client::BucketClient;
pub use constants::*;
pub use state::*;
