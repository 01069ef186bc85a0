//! different utility modules used throughout the project
/// tiny module to save the refinement history into file
pub mod logger;
/// parse document with structure like " title1 key1: value1, value2 key2: value2" into HashMap
pub mod task_parser;
