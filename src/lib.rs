pub mod application;
pub mod commands;
pub mod http;
pub mod index;
pub mod installer;
pub mod manifest;
pub mod package;
pub mod project;
pub mod runtime;
