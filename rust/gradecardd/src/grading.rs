use serde::{Deserialize, Serialize};

/// Grade input sentinel meaning "did not attend".
pub const ABSENT_SENTINEL: &str = "NP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    Absent,
    Score(i64),
}

impl Grade {
    /// JSON shape used by the front end: `null` for absent, a number otherwise.
    pub fn as_option(self) -> Option<i64> {
        match self {
            Grade::Absent => None,
            Grade::Score(v) => Some(v),
        }
    }
}

/// Grading policy declared by a report. Thresholds of the two scales are
/// independent and must never be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeScale {
    /// 0-20 scale.
    #[default]
    Vigesimal,
    /// 0-5 scale.
    Quinary,
}

impl GradeScale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vigesimal" | "20" => Some(GradeScale::Vigesimal),
            "quinary" | "5" => Some(GradeScale::Quinary),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GradeScale::Vigesimal => "vigesimal",
            GradeScale::Quinary => "quinary",
        }
    }

    pub fn max(self) -> i64 {
        match self {
            GradeScale::Vigesimal => 20,
            GradeScale::Quinary => 5,
        }
    }

    /// Whether the form offers and the legend advertises the absent marker.
    pub fn offers_absent(self) -> bool {
        matches!(self, GradeScale::Vigesimal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub code: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub background: &'static str,
}

pub const ABSENT: Band = Band {
    code: "NP",
    label: "No se presentó",
    color: "#6b7280",
    background: "#f3f4f6",
};
pub const EXCELLENT: Band = Band {
    code: "AD",
    label: "Excelente",
    color: "#059669",
    background: "#ecfdf5",
};
pub const GOOD: Band = Band {
    code: "A",
    label: "Bueno",
    color: "#2563eb",
    background: "#eff6ff",
};
pub const FAIR: Band = Band {
    code: "B",
    label: "Regular",
    color: "#d97706",
    background: "#fffbeb",
};
pub const LOW: Band = Band {
    code: "C",
    label: "Bajo",
    color: "#ef4444",
    background: "#fef2f2",
};

/// Maps a grade to its band. Total: out-of-range values land in the lowest
/// or highest band, and the absent marker is NP on every scale.
pub fn classify(scale: GradeScale, grade: Grade) -> Band {
    let v = match grade {
        Grade::Absent => return ABSENT,
        Grade::Score(v) => v,
    };
    match scale {
        GradeScale::Vigesimal => {
            if v >= 17 {
                EXCELLENT
            } else if v >= 13 {
                GOOD
            } else if v >= 9 {
                FAIR
            } else {
                LOW
            }
        }
        GradeScale::Quinary => {
            if v >= 4 {
                EXCELLENT
            } else if v >= 2 {
                FAIR
            } else {
                LOW
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub code: &'static str,
    pub label: &'static str,
    pub range: &'static str,
    pub dot_color: &'static str,
}

const VIGESIMAL_LEGEND: [LegendEntry; 4] = [
    LegendEntry {
        code: "AD",
        label: "Excelente",
        range: "17-20",
        dot_color: "#10b981",
    },
    LegendEntry {
        code: "A",
        label: "Bueno",
        range: "13-16",
        dot_color: "#3b82f6",
    },
    LegendEntry {
        code: "B",
        label: "Regular",
        range: "9-12",
        dot_color: "#f59e0b",
    },
    LegendEntry {
        code: "C",
        label: "Bajo",
        range: "0-8",
        dot_color: "#ef4444",
    },
];

const QUINARY_LEGEND: [LegendEntry; 3] = [
    LegendEntry {
        code: "AD",
        label: "Excelente",
        range: "4-5",
        dot_color: "#10b981",
    },
    LegendEntry {
        code: "B",
        label: "Regular",
        range: "2-3",
        dot_color: "#f59e0b",
    },
    LegendEntry {
        code: "C",
        label: "Bajo",
        range: "0-1",
        dot_color: "#ef4444",
    },
];

pub fn legend(scale: GradeScale) -> &'static [LegendEntry] {
    match scale {
        GradeScale::Vigesimal => &VIGESIMAL_LEGEND,
        GradeScale::Quinary => &QUINARY_LEGEND,
    }
}

impl LegendEntry {
    /// Footer text, e.g. `AD Excelente (17-20)`.
    pub fn caption(&self) -> String {
        format!("{} {} ({})", self.code, self.label, self.range)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeOption {
    pub value: String,
    pub label: String,
}

/// Entries of the grade select in the student form.
pub fn grade_options(scale: GradeScale) -> Vec<GradeOption> {
    let mut out = Vec::with_capacity(scale.max() as usize + 2);
    if scale.offers_absent() {
        out.push(GradeOption {
            value: ABSENT_SENTINEL.to_string(),
            label: ABSENT.label.to_string(),
        });
    }
    for n in 0..=scale.max() {
        let band = classify(scale, Grade::Score(n));
        out.push(GradeOption {
            value: n.to_string(),
            label: format!("{} ({})", n, band.code),
        });
    }
    out
}

/// Badge shown in the grade card: `AD = 18`, or the absent label.
pub fn card_badge(scale: GradeScale, grade: Grade) -> String {
    match grade {
        Grade::Absent => ABSENT.label.to_string(),
        Grade::Score(v) => format!("{} = {}", classify(scale, grade).code, v),
    }
}

/// Short badge shown in the form's student list: `NP` or `AD = 18`.
pub fn form_badge(scale: GradeScale, grade: Grade) -> String {
    match grade {
        Grade::Absent => ABSENT.code.to_string(),
        Grade::Score(_) => card_badge(scale, grade),
    }
}
