//! Benchmark utilities for the ECS.
//!
//! - **Microbenchmarks** (`benches/ecs_micro.rs`): individual operations in
//!   isolation — entity create/destroy, attach/detach, field access, query
//!   preparation and iteration.
//! - **Scenario benchmarks** (`benches/ecs_scenarios.rs`): realistic
//!   workloads driven through the scheduler, with seeded random data.
//!
//! # Running
//!
//! ```bash
//! cargo bench -p easel_bench
//! cargo bench -p easel_bench -- spawn
//! ```
//!
//! Results land in `target/criterion/` with HTML reports.

pub mod components;
pub mod scenarios;
