use crate::validate::{FieldDef, FieldType};

/// Fact types the admin UI manages, in menu order.
pub const FACT_TYPES: [&str; 7] = [
    "course",
    "teacher",
    "classroom",
    "student",
    "student_group",
    "subject",
    "timeblock",
];

fn field(key: &str, field_type: FieldType, required: bool) -> FieldDef {
    FieldDef {
        key: key.to_string(),
        field_type,
        required,
        multiple_values: false,
        possible_answers: Vec::new(),
        source: None,
        can_be_elective: false,
    }
}

fn text(key: &str, required: bool) -> FieldDef {
    field(key, FieldType::Text, required)
}

fn number(key: &str, required: bool) -> FieldDef {
    field(key, FieldType::Number, required)
}

fn unique_text(key: &str, required: bool) -> FieldDef {
    field(key, FieldType::UniqueText, required)
}

fn dropdown(key: &str, required: bool, answers: &[&str]) -> FieldDef {
    FieldDef {
        possible_answers: answers.iter().map(|a| a.to_string()).collect(),
        ..field(key, FieldType::Dropdown, required)
    }
}

fn min_max(key: &str, required: bool) -> FieldDef {
    FieldDef {
        multiple_values: true,
        ..field(key, FieldType::MinMax, required)
    }
}

fn start_end(key: &str, required: bool) -> FieldDef {
    field(key, FieldType::StartEnd, required)
}

fn constraint(key: &str, source: &str, required: bool) -> FieldDef {
    FieldDef {
        multiple_values: true,
        source: Some(source.to_string()),
        ..field(key, FieldType::Constraint, required)
    }
}

/// The field set for one fact type, or None for an unknown type. These
/// mirror the backend's entity schema; constraint fields name the fact
/// type whose records feed their picker.
pub fn fields_for(fact_type: &str) -> Option<Vec<FieldDef>> {
    let fields = match fact_type {
        "course" => vec![
            text("name", true),
            dropdown("term", true, &["year", "quarter"]),
            min_max("student_count", false),
            number("duration", false),
            constraint("timeblock", "timeblock", false),
            constraint("subject", "subject", false),
            constraint("teacher", "teacher", false),
            constraint("classroom", "classroom", false),
        ],
        "teacher" => vec![
            text("first_name", true),
            text("last_name", true),
            start_end("avail_start_time", false),
            start_end("avail_end_time", false),
            constraint("day", "day", true),
            constraint("subject", "subject", false),
            constraint("course", "course", false),
            constraint("classroom", "classroom", false),
        ],
        "classroom" => vec![
            unique_text("room_number", true),
            start_end("avail_start_time", false),
            start_end("avail_end_time", false),
            constraint("timeblock", "timeblock", false),
            constraint("subject", "subject", false),
            constraint("teacher", "teacher", false),
            constraint("course", "course", false),
        ],
        "student" => vec![
            text("first_name", true),
            text("last_name", true),
            unique_text("user_id", false),
            constraint("student_group", "student_group", false),
            FieldDef {
                can_be_elective: true,
                ..constraint("course", "course", false)
            },
        ],
        "student_group" => vec![
            text("name", true),
            constraint("student", "student", false),
            constraint("timeblock", "timeblock", false),
        ],
        "subject" => vec![
            text("name", true),
            constraint("course", "course", false),
            constraint("timeblock", "timeblock", false),
        ],
        "timeblock" => vec![
            start_end("start_time", true),
            start_end("end_time", true),
        ],
        _ => return None,
    };
    Some(fields)
}
