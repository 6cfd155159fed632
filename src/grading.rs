use crate::store::Student;

pub const SUBJECTS: [&str; 4] = ["math", "science", "history", "english"];
const MAX_TOTAL: f64 = 400.0;

/// Half-up 2-decimal rounding: `Int(100*x + 0.5) / 100`, with a small nudge
/// so values like 3.575 (stored as 3.5749999…) still round up to 3.58.
pub fn round2(x: f64) -> f64 {
    ((100.0 * x) + 0.5 + 1e-9).floor() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub gpa: f64,
    pub percentage: f64,
    pub grade: &'static str,
}

pub fn subject_marks(s: &Student) -> [u32; 4] {
    [s.math, s.science, s.history, s.english]
}

/// Raw four-subject total, unrounded. Ranking compares these directly,
/// independent of how percentage and GPA are rounded for display.
pub fn raw_total(s: &Student) -> u32 {
    s.math + s.science + s.history + s.english
}

pub fn compute_metrics(s: &Student) -> Metrics {
    let percentage = 100.0 * f64::from(raw_total(s)) / MAX_TOTAL;

    // 4.0-scale conversion, piecewise linear below 90.
    let gpa = if percentage >= 90.0 {
        4.0
    } else if percentage >= 80.0 {
        3.0 + (percentage - 80.0) / 10.0
    } else if percentage >= 70.0 {
        2.0 + (percentage - 70.0) / 10.0
    } else if percentage >= 60.0 {
        1.0 + (percentage - 60.0) / 10.0
    } else {
        percentage / 60.0
    };

    Metrics {
        gpa: round2(gpa),
        percentage: round2(percentage),
        grade: letter_grade(percentage),
    }
}

/// Letter bands are inclusive on their lower bound; no gaps, no overlaps.
pub fn letter_grade(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "A"
    } else if percentage >= 80.0 {
        "B"
    } else if percentage >= 70.0 {
        "C"
    } else if percentage >= 60.0 {
        "D"
    } else {
        "F"
    }
}

/// Competition ranking: 1 plus the number of students whose raw total
/// strictly exceeds this student's. Ties share a rank and the next distinct
/// total takes the rank after the tied block (1, 1, 3 — never compacted).
pub fn class_rank(student: &Student, all: &[Student]) -> usize {
    let mine = raw_total(student);
    1 + all.iter().filter(|s| raw_total(s) > mine).count()
}
