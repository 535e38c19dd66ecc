#![allow(dead_code)]

pub mod hotel_env;
pub mod raw;
