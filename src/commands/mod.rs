pub mod analyze;
pub mod combine;
pub mod report;
pub mod toc;
