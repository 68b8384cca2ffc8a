//! Static practice material: sentences to analyse and a multiple-choice
//! quiz bank.

use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use serde::Serialize;
use serde_json::Value;

pub const CORRECT_FEEDBACK: &str = "إجابتك صحيحة! 🎉";
pub const WRONG_FEEDBACK: &str = "إجابتك خاطئة، حاول مرة أخرى. 😅";

pub static RANDOM_SENTENCES: [&str; 19] = [
    "ذهب أحمد إلى المدرسة.",
    "السيارة سريعة جداً.",
    "الطفل يلعب بالكرة.",
    "السماء صافية اليوم.",
    "القطط تلعب في الحديقة.",
    "المعلم يشرح الدرس بوضوح.",
    "أكلتُ تفاحة لذيذة.",
    "الزهور جميلة في الربيع.",
    "نجحتُ في الامتحان بفضل الله.",
    "أحب القراءة في الصباح.",
    "الجندي يحمي الوطن.",
    "الشمس مشرقة في السماء.",
    "اشتريتُ كتابًا جديدًا من المكتبة.",
    "المهندس يبني المباني العالية.",
    "الأم تهتم بأطفالها.",
    "الطبيب يعالج المرضى.",
    "التاجر يبيع البضائع في السوق.",
    "الرياضي يجري بسرعة.",
    "العصفور يغرد على الشجرة.",
];

/// One multiple-choice question. `correct` is sent to the client along
/// with the options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    pub question: &'static str,
    pub options: Vec<&'static str>,
    pub correct: &'static str,
    pub instruction: &'static str,
}

fn q(
    question: &'static str,
    options: [&'static str; 3],
    correct: &'static str,
    instruction: &'static str,
) -> QuizQuestion {
    QuizQuestion {
        question,
        options: options.to_vec(),
        correct,
        instruction,
    }
}

pub static QUIZ_QUESTIONS: Lazy<Vec<QuizQuestion>> = Lazy::new(|| {
    vec![
        q("الطلاب يدرسون بجدية.", ["مبتدأ", "خبر", "فاعل"], "مبتدأ", "ما هو إعراب 'الطلاب' في هذه الجملة؟"),
        q("قرأتُ كتبًا كثيرة.", ["مفعول به", "فاعل", "حال"], "مفعول به", "ما هو إعراب 'كتبًا' في هذه الجملة؟"),
        q("البنات نشيطات.", ["مبتدأ", "خبر", "جمع مؤنث سالم"], "جمع مؤنث سالم", "ما هو إعراب 'البنات' في هذه الجملة؟"),
        q("المعلمات ماهرات في التدريس.", ["مبتدأ", "خبر", "جمع مؤنث سالم"], "جمع مؤنث سالم", "ما هو إعراب 'المعلمات' في هذه الجملة؟"),
        q("الفاعل في الجملة يرفع بالـ...", ["الضمة", "الفتحة", "الكسرة"], "الضمة", "ما هي علامة رفع الفاعل؟"),
        q("المفعول به في الجملة ينصب بالـ...", ["الفتحة", "الضمة", "الكسرة"], "الفتحة", "ما هي علامة نصب المفعول به؟"),
        q("المضاف إليه يجر بالـ...", ["الكسرة", "الضمة", "الفتحة"], "الكسرة", "ما هي علامة جر المضاف إليه؟"),
        q("اجتهدتُ في دراستي. ما هو إعراب 'اجتهدتُ'؟", ["فعل ماضٍ", "فعل مضارع", "اسم"], "فعل ماضٍ", "ما هو نوع الفعل 'اجتهدتُ' في هذه الجملة؟"),
        q("الصيف حار في الرياض. ما هو إعراب 'حار'؟", ["مبتدأ", "خبر", "صفة"], "خبر", "ما هو إعراب 'حار' في هذه الجملة؟"),
        q("يُكرم الرجل ضيفه. ما هو إعراب 'الرجل'؟", ["مبتدأ", "فاعل", "مفعول به"], "فاعل", "ما هو إعراب 'الرجل' في هذه الجملة؟"),
        q("الطالب المجتهد مميز. ما هو إعراب 'المجتهد'؟", ["نعت", "مبتدأ", "خبر"], "نعت", "ما هو إعراب 'المجتهد' في هذه الجملة؟"),
        q("الممرضات مجتهدات في العمل.", ["مبتدأ", "خبر", "جمع مؤنث سالم"], "جمع مؤنث سالم", "ما هو إعراب 'الممرضات' في هذه الجملة؟"),
        q("الطالبات يحضرن الدروس بانتظام.", ["مبتدأ", "جمع مؤنث سالم", "مفعول به"], "جمع مؤنث سالم", "ما هو إعراب 'الطالبات' في هذه الجملة؟"),
        q("المدرسة الكبيرة جميلة.", ["مبتدأ", "صفة", "مفعول به"], "مبتدأ", "ما هو إعراب 'المدرسة' في هذه الجملة؟"),
        q("الطائرة سريعة جدًا.", ["مبتدأ", "خبر", "فاعل"], "مبتدأ", "ما هو إعراب 'الطائرة' في هذه الجملة؟"),
        q("الطالب المبدع ينجح دائمًا.", ["مبتدأ", "نعت", "مفعول به"], "مبتدأ", "ما هو إعراب 'الطالب' في هذه الجملة؟"),
        q("رأيتُ المعلمة في الفصل.", ["فاعل", "مضاف", "مفعول به"], "مفعول به", "ما هو إعراب 'المعلمة' في هذه الجملة؟"),
        q("جاءت النساء إلى الاجتماع.", ["مبتدأ", "جمع مؤنث سالم", "خبر"], "جمع مؤنث سالم", "ما هو إعراب 'النساء' في هذه الجملة؟"),
        q("المثنى في الجملة يُرفع بالـ...", ["الألف", "الضمة", "الفتحة"], "الألف", "ما هي علامة رفع المثنى؟"),
        q("البنات مجتهدات. ما هو إعراب 'مجتهدات'؟", ["نعت", "جمع مؤنث سالم", "حال"], "جمع مؤنث سالم", "ما هو إعراب 'مجتهدات' في هذه الجملة؟"),
        q("اشتريتُ عشر كتب. ما هو إعراب 'كتب'؟", ["مضاف", "تمييز", "مفعول به"], "تمييز", "ما هو إعراب 'كتب' في هذه الجملة؟"),
        q("التلميذان مجتهدان. ما هو إعراب 'التلميذان'؟", ["مبتدأ", "مثنى", "مضاف"], "مثنى", "ما هو إعراب 'التلميذان' في هذه الجملة؟"),
        q("قابلتُ مريمَ في السوق.", ["ممنوع من الصرف", "مفعول به", "حال"], "ممنوع من الصرف", "ما هو إعراب 'مريم' في هذه الجملة؟"),
        q("ضربتُ ضربًا شديدًا. ما هو إعراب 'ضربًا'؟", ["مفعول مطلق", "مفعول به", "حال"], "مفعول مطلق", "ما هو إعراب 'ضربًا' في هذه الجملة؟"),
        q("كانت السماء صافية. ما هو إعراب 'صافية'؟", ["خبر كان", "حال", "صفة"], "خبر كان", "ما هو إعراب 'صافية' في هذه الجملة؟"),
        q("الجملة: 'كانت الفتاة سعيدة'. ما هو إعراب 'سعيدة'؟", ["حال", "خبر كان", "نعت"], "خبر كان", "ما هو إعراب 'سعيدة' في هذه الجملة؟"),
    ]
});

/// Uniform choice over [`RANDOM_SENTENCES`].
pub fn random_sentence() -> &'static str {
    RANDOM_SENTENCES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(RANDOM_SENTENCES[0])
}

/// Uniform choice over [`QUIZ_QUESTIONS`].
pub fn random_question() -> &'static QuizQuestion {
    let bank: &'static [QuizQuestion] = QUIZ_QUESTIONS.as_slice();
    bank.choose(&mut rand::rng()).unwrap_or(&bank[0])
}

/// Exact comparison of arbitrary JSON values; no normalisation of case,
/// whitespace or diacritics. Two absent values compare equal.
pub fn check_answer(answer: Option<&Value>, correct: Option<&Value>) -> &'static str {
    if answer == correct {
        CORRECT_FEEDBACK
    } else {
        WRONG_FEEDBACK
    }
}
