// Tests module
// Cross-module scenarios: form submit -> store -> export/import

pub mod end_to_end;
