//! End-to-end research scenarios against deterministic fakes.

pub(crate) mod fakes;

mod end_to_end;
