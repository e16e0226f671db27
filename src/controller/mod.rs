pub mod application_segment;
pub mod segment_group;

fn bool_value(b: Option<bool>) -> bool {
    b.unwrap_or(false)
}
