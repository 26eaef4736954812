//! Porter suffix-stripping stemmer.
//!
//! Follows Porter (1980) with the refinements NLTK's `PorterStemmer` applies
//! in its default mode: a small table of irregular forms, words of two
//! letters or fewer left alone, `-ies`/`-ied` on four-letter words kept as
//! `-ie`, `y -> i` only after a consonant that is not the first letter, and
//! the extra step 2 rules (`bli`, `fulli`, `lessli`, `logi`).
//!
//! Each step is an ordered rule list. The first rule whose suffix matches
//! decides the step, whether or not its condition holds.

/// Forms that bypass the rules entirely
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("skies", "sky"),
    ("sky", "sky"),
    ("dying", "die"),
    ("lying", "lie"),
    ("tying", "tie"),
    ("news", "news"),
    ("innings", "inning"),
    ("inning", "inning"),
    ("outings", "outing"),
    ("outing", "outing"),
    ("cannings", "canning"),
    ("canning", "canning"),
    ("howe", "howe"),
    ("proceed", "proceed"),
    ("exceed", "exceed"),
    ("succeed", "succeed"),
];

/// Condition a rule places on the stem left once its suffix is removed
#[derive(Debug, Clone, Copy)]
enum Condition {
    Always,
    /// Measure of the stem is above the given value
    MeasureAbove(usize),
    /// Step 4 `-ion`: measure above one and the stem ends in `s` or `t`
    IonStem,
}

struct Rule {
    suffix: &'static str,
    replacement: &'static str,
    condition: Condition,
}

const fn rule(suffix: &'static str, replacement: &'static str, condition: Condition) -> Rule {
    Rule {
        suffix,
        replacement,
        condition,
    }
}

const POSITIVE: Condition = Condition::MeasureAbove(0);
const ABOVE_ONE: Condition = Condition::MeasureAbove(1);

const STEP1A: &[Rule] = &[
    rule("sses", "ss", Condition::Always),
    rule("ies", "i", Condition::Always),
    rule("ss", "ss", Condition::Always),
    rule("s", "", Condition::Always),
];

const STEP2: &[Rule] = &[
    rule("ational", "ate", POSITIVE),
    rule("tional", "tion", POSITIVE),
    rule("enci", "ence", POSITIVE),
    rule("anci", "ance", POSITIVE),
    rule("izer", "ize", POSITIVE),
    rule("bli", "ble", POSITIVE),
    rule("alli", "al", POSITIVE),
    rule("entli", "ent", POSITIVE),
    rule("eli", "e", POSITIVE),
    rule("ousli", "ous", POSITIVE),
    rule("ization", "ize", POSITIVE),
    rule("ation", "ate", POSITIVE),
    rule("ator", "ate", POSITIVE),
    rule("alism", "al", POSITIVE),
    rule("iveness", "ive", POSITIVE),
    rule("fulness", "ful", POSITIVE),
    rule("ousness", "ous", POSITIVE),
    rule("aliti", "al", POSITIVE),
    rule("iviti", "ive", POSITIVE),
    rule("biliti", "ble", POSITIVE),
    rule("fulli", "ful", POSITIVE),
    rule("lessli", "less", POSITIVE),
];

const STEP3: &[Rule] = &[
    rule("icate", "ic", POSITIVE),
    rule("ative", "", POSITIVE),
    rule("alize", "al", POSITIVE),
    rule("iciti", "ic", POSITIVE),
    rule("ical", "ic", POSITIVE),
    rule("ful", "", POSITIVE),
    rule("ness", "", POSITIVE),
];

const STEP4: &[Rule] = &[
    rule("al", "", ABOVE_ONE),
    rule("ance", "", ABOVE_ONE),
    rule("ence", "", ABOVE_ONE),
    rule("er", "", ABOVE_ONE),
    rule("ic", "", ABOVE_ONE),
    rule("able", "", ABOVE_ONE),
    rule("ible", "", ABOVE_ONE),
    rule("ant", "", ABOVE_ONE),
    rule("ement", "", ABOVE_ONE),
    rule("ment", "", ABOVE_ONE),
    rule("ent", "", ABOVE_ONE),
    rule("ion", "", Condition::IonStem),
    rule("ou", "", ABOVE_ONE),
    rule("ism", "", ABOVE_ONE),
    rule("ate", "", ABOVE_ONE),
    rule("iti", "", ABOVE_ONE),
    rule("ous", "", ABOVE_ONE),
    rule("ive", "", ABOVE_ONE),
    rule("ize", "", ABOVE_ONE),
];

/// Porter stemmer over lowercase ASCII tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    pub fn new() -> Self {
        Self
    }

    pub fn stem(&self, word: &str) -> String {
        if let Some(&(_, stem)) = IRREGULAR_FORMS.iter().find(|(form, _)| *form == word) {
            return stem.to_string();
        }
        if word.len() <= 2 {
            return word.to_string();
        }

        let word = step1a(word);
        let word = step1b(&word);
        let word = step1c(&word);
        let word = step2(&word);
        let word = apply_rules(&word, STEP3);
        let word = apply_rules(&word, STEP4);
        let word = step5a(&word);
        step5b(&word)
    }
}

/// A letter other than a vowel, where `y` after a consonant counts as a vowel
fn is_consonant(word: &[u8], i: usize) -> bool {
    match word[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(word, i - 1),
        _ => true,
    }
}

/// Number of vowel-consonant sequences, the `m` in `[C](VC)^m[V]`
fn measure(stem: &str) -> usize {
    let bytes = stem.as_bytes();
    let mut count = 0;
    let mut previous_vowel = false;
    for i in 0..bytes.len() {
        let consonant = is_consonant(bytes, i);
        if consonant && previous_vowel {
            count += 1;
        }
        previous_vowel = !consonant;
    }
    count
}

fn contains_vowel(stem: &str) -> bool {
    let bytes = stem.as_bytes();
    (0..bytes.len()).any(|i| !is_consonant(bytes, i))
}

fn ends_double_consonant(word: &str) -> bool {
    let bytes = word.as_bytes();
    let n = bytes.len();
    n >= 2 && bytes[n - 1] == bytes[n - 2] && is_consonant(bytes, n - 1)
}

/// `*o`: consonant-vowel-consonant ending where the last letter is not
/// `w`, `x` or `y`; a two-letter vowel-consonant word also qualifies
fn ends_cvc(word: &str) -> bool {
    let bytes = word.as_bytes();
    let n = bytes.len();
    if n >= 3 {
        is_consonant(bytes, n - 3)
            && !is_consonant(bytes, n - 2)
            && is_consonant(bytes, n - 1)
            && !matches!(bytes[n - 1], b'w' | b'x' | b'y')
    } else {
        n == 2 && !is_consonant(bytes, 0) && is_consonant(bytes, 1)
    }
}

fn holds(condition: Condition, stem: &str) -> bool {
    match condition {
        Condition::Always => true,
        Condition::MeasureAbove(m) => measure(stem) > m,
        Condition::IonStem => measure(stem) > 1 && (stem.ends_with('s') || stem.ends_with('t')),
    }
}

fn apply_rules(word: &str, rules: &[Rule]) -> String {
    for rule in rules {
        if let Some(stem) = word.strip_suffix(rule.suffix) {
            if holds(rule.condition, stem) {
                return format!("{}{}", stem, rule.replacement);
            }
            return word.to_string();
        }
    }
    word.to_string()
}

fn step1a(word: &str) -> String {
    if word.len() == 4 && word.ends_with("ies") {
        return format!("{}ie", &word[..1]);
    }
    apply_rules(word, STEP1A)
}

fn step1b(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ied") {
        let replacement = if word.len() == 4 { "ie" } else { "i" };
        return format!("{}{}", stem, replacement);
    }

    if let Some(stem) = word.strip_suffix("eed") {
        if measure(stem) > 0 {
            return format!("{}ee", stem);
        }
        return word.to_string();
    }

    let Some(stem) = ["ed", "ing"]
        .iter()
        .find_map(|suffix| word.strip_suffix(suffix))
        .filter(|stem| contains_vowel(stem))
    else {
        return word.to_string();
    };

    if stem.ends_with("at") || stem.ends_with("bl") || stem.ends_with("iz") {
        format!("{}e", stem)
    } else if ends_double_consonant(stem) {
        if stem.ends_with('l') || stem.ends_with('s') || stem.ends_with('z') {
            stem.to_string()
        } else {
            stem[..stem.len() - 1].to_string()
        }
    } else if measure(stem) == 1 && ends_cvc(stem) {
        format!("{}e", stem)
    } else {
        stem.to_string()
    }
}

fn step1c(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        if stem.len() > 1 && is_consonant(stem.as_bytes(), stem.len() - 1) {
            return format!("{}i", stem);
        }
    }
    word.to_string()
}

fn step2(word: &str) -> String {
    // `alli` is tried first and its result goes through the step again
    if let Some(stem) = word.strip_suffix("alli") {
        if measure(stem) > 0 {
            return step2(&format!("{}al", stem));
        }
    }

    // `logi -> log` measures the stem with its `l`
    if let Some(stem) = word.strip_suffix("ogi") {
        if stem.ends_with('l') && measure(stem) > 0 {
            return format!("{}og", stem);
        }
    }

    apply_rules(word, STEP2)
}

fn step5a(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('e') {
        let m = measure(stem);
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            return stem.to_string();
        }
    }
    word.to_string()
}

fn step5b(word: &str) -> String {
    if word.ends_with("ll") && measure(&word[..word.len() - 1]) > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}
