//! UI pieces shared by the terminal and headless front ends

pub mod faces;
pub mod theme;
