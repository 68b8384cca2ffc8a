//! Few-shot prompt templates and generation parameters for both stages.

use serde::Serialize;

/// Worked examples shared by both stages.
const FEW_SHOT_EXAMPLES: &str = concat!(
    "مثال 1: ذهب أحمد إلى المدرسة.\n",
    "الإعراب: ذهب: فعل ماضٍ مبني على الفتح، أحمد: فاعل مرفوع وعلامة رفعه الضمة الظاهرة على آخره، ",
    "إلى: حرف جر، المدرسة: اسم مجرور وعلامة جره الكسرة الظاهرة على آخره.\n\n",
    "مثال 2: السماء صافية اليوم.\n",
    "الإعراب: السماء: مبتدأ مرفوع وعلامة رفعه الضمة الظاهرة على آخره، صافية: خبر مرفوع وعلامة رفعه الضمة الظاهرة على آخره، ",
    "اليوم: ظرف زمان منصوب وعلامة نصبه الفتحة الظاهرة على آخره.\n\n",
    "مثال 3: الطالب يذاكر دروسه بجدية.\n",
    "الإعراب: الطالب: مبتدأ مرفوع وعلامة رفعه الضمة الظاهرة على آخره، يذاكر: فعل مضارع مرفوع وعلامة رفعه الضمة الظاهرة على آخره، ",
    "دروسه: مفعول به منصوب وعلامة نصبه الفتحة الظاهرة على آخره، والهاء: ضمير متصل في محل جر بالإضافة، بجدية: جار ومجرور.\n\n",
    "مثال 4: القمر يضيء السماء ليلاً.\n",
    "الإعراب: القمر: مبتدأ مرفوع وعلامة رفعه الضمة الظاهرة على آخره، يضيء: فعل مضارع مرفوع وعلامة رفعه الضمة الظاهرة على آخره، ",
    "السماء: مفعول به منصوب وعلامة نصبه الفتحة الظاهرة على آخره، ليلاً: ظرف زمان منصوب وعلامة نصبه الفتحة الظاهرة على آخره.\n\n",
);

const VALIDATION_PREAMBLE: &str = concat!(
    "رجاءً قم بتحليل الجملة التالية دون أي تفكير إضافي.ولا تقدم أي معلومات إضافية ",
    "لا تهتم بالمنطق أو المعنى، فقط قم بالتحليل النحوي كما هو:\n\n",
);

const ANALYSIS_PREAMBLE: &str =
    "رجاءً قم بإعراب كامل للجملة التالية فقط ولا تقدم أي معلومات إضافية:\n\n";

/// Trailing cue that the analysis prompt ends with.
pub const ANALYSIS_CUE: &str = "الإعراب:";

/// Sampling parameters sent alongside a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    pub decoding_method: &'static str,
    pub max_new_tokens: u32,
    pub repetition_penalty: f64,
}

pub const VALIDATION_PARAMS: GenerationParams = GenerationParams {
    decoding_method: "greedy",
    max_new_tokens: 50,
    repetition_penalty: 1.1,
};

pub const ANALYSIS_PARAMS: GenerationParams = GenerationParams {
    decoding_method: "greedy",
    max_new_tokens: 300,
    repetition_penalty: 1.2,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validation,
    Analysis,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Validation => "validation",
            Stage::Analysis => "analysis",
        }
    }

    pub fn params(self) -> GenerationParams {
        match self {
            Stage::Validation => VALIDATION_PARAMS,
            Stage::Analysis => ANALYSIS_PARAMS,
        }
    }

    pub fn prompt(self, sentence: &str) -> String {
        match self {
            Stage::Validation => validation_prompt(sentence),
            Stage::Analysis => analysis_prompt(sentence),
        }
    }
}

pub fn validation_prompt(sentence: &str) -> String {
    format!(
        "{}{}الجملة: {}",
        VALIDATION_PREAMBLE, FEW_SHOT_EXAMPLES, sentence
    )
}

pub fn analysis_prompt(sentence: &str) -> String {
    format!(
        "{}{}الجملة: {}\n{}",
        ANALYSIS_PREAMBLE, FEW_SHOT_EXAMPLES, sentence, ANALYSIS_CUE
    )
}
