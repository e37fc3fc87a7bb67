use crate::grading::{Grade, ABSENT_SENTINEL};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub grade: Grade,
}

/// Roster entry as seen outside the store: no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentEntry {
    pub name: String,
    pub grade: Option<i64>,
}

impl StudentEntry {
    pub fn grade(&self) -> Grade {
        match self.grade {
            Some(v) => Grade::Score(v),
            None => Grade::Absent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedGrade {
    pub grade: Grade,
    /// The input had no readable integer and was replaced by 0.
    pub coerced: bool,
}

/// Interprets raw grade input from the form.
///
/// `NP` is the absent marker. Anything else is read as a leading integer
/// (leading whitespace, optional sign, digits; trailing text ignored), so
/// `"12abc"` is 12 and `"3.9"` is 3. Input with no digits becomes 0.
pub fn parse_grade_input(raw: &str) -> ParsedGrade {
    if raw == ABSENT_SENTINEL {
        return ParsedGrade {
            grade: Grade::Absent,
            coerced: false,
        };
    }
    match parse_leading_int(raw) {
        Some(v) => ParsedGrade {
            grade: Grade::Score(v),
            coerced: false,
        },
        None => ParsedGrade {
            grade: Grade::Score(0),
            coerced: true,
        },
    }
}

fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let v: i64 = digits[..end].parse().ok()?;
    Some(if negative { -v } else { v })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    pub id: Uuid,
    pub coerced: bool,
}

/// Ordered, insertion-order roster of one report session.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a student. Returns `None` (and changes nothing) when the
    /// trimmed name is empty.
    pub fn add(&mut self, name: &str, grade_input: &str) -> Option<AddOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let parsed = parse_grade_input(grade_input);
        let id = Uuid::new_v4();
        self.students.push(Student {
            id,
            name: name.to_string(),
            grade: parsed.grade,
        });
        Some(AddOutcome {
            id,
            coerced: parsed.coerced,
        })
    }

    /// Removes the student with `id`; returns whether anything was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        self.students.len() != before
    }

    pub fn clear(&mut self) {
        self.students.clear();
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Student> {
        self.students.iter()
    }

    pub fn snapshot(&self) -> Vec<StudentEntry> {
        self.students
            .iter()
            .map(|s| StudentEntry {
                name: s.name.clone(),
                grade: s.grade.as_option(),
            })
            .collect()
    }
}
