pub mod json_lines_record_store;
