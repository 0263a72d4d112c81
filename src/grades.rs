/// Qualitative bucket a grade falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Excellent,
    Distinction,
    Pass,
    Fail,
}

pub const PASS_THRESHOLD: f64 = 5.0;
pub const DISTINCTION_THRESHOLD: f64 = 7.0;
pub const EXCELLENT_THRESHOLD: f64 = 9.0;

/// Classifies any real number, including values outside `[0, 10]`.
/// NaN fails every comparison and ends up in `Fail`.
pub fn classify(grade: f64) -> Bucket {
    if grade >= EXCELLENT_THRESHOLD {
        Bucket::Excellent
    } else if grade >= DISTINCTION_THRESHOLD {
        Bucket::Distinction
    } else if grade >= PASS_THRESHOLD {
        Bucket::Pass
    } else {
        Bucket::Fail
    }
}

impl Bucket {
    pub fn css_class(self) -> &'static str {
        match self {
            Bucket::Excellent => "nota-excelente",
            Bucket::Distinction => "nota-notable",
            Bucket::Pass => "nota-aprobado",
            Bucket::Fail => "nota-suspendido",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Excellent => "Sobresaliente",
            Bucket::Distinction => "Notable",
            Bucket::Pass => "Aprobado",
            Bucket::Fail => "Suspenso",
        }
    }

    pub fn is_passing(self) -> bool {
        self != Bucket::Fail
    }
}
