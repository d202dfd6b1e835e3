//! Rule-based lemmatizer in the style of WordNet's `morphy`.
//!
//! Irregular forms are looked up first, then the word class's suffix rules are
//! applied. Verb stems are repaired after detaching `-ed`/`-ing`: doubled final
//! consonants are undoubled and a dropped trailing `e` is restored when the
//! stem shape calls for it.

use super::tagger::is_plural_shaped;
use super::WordClass;

const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("analyses", "analysis"),
    ("bases", "basis"),
    ("children", "child"),
    ("criteria", "criterion"),
    ("diagnoses", "diagnosis"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("hypotheses", "hypothesis"),
    ("indices", "index"),
    ("lives", "life"),
    ("matrices", "matrix"),
    ("men", "man"),
    ("mice", "mouse"),
    ("phenomena", "phenomenon"),
    ("teeth", "tooth"),
    ("theses", "thesis"),
    ("vertices", "vertex"),
    ("wives", "wife"),
    ("women", "woman"),
];

const VERB_EXCEPTIONS: &[(&str, &str)] = &[
    ("added", "add"),
    ("adding", "add"),
    ("based", "base"),
    ("began", "begin"),
    ("begun", "begin"),
    ("bought", "buy"),
    ("brought", "bring"),
    ("built", "build"),
    ("caused", "cause"),
    ("causing", "cause"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("created", "create"),
    ("creating", "create"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("focused", "focus"),
    ("focusing", "focus"),
    ("found", "find"),
    ("gave", "give"),
    ("given", "give"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("guided", "guide"),
    ("guiding", "guide"),
    ("held", "hold"),
    ("kept", "keep"),
    ("knew", "know"),
    ("known", "know"),
    ("led", "lead"),
    ("left", "leave"),
    ("made", "make"),
    ("met", "meet"),
    ("paid", "pay"),
    ("ran", "run"),
    ("saw", "see"),
    ("seen", "see"),
    ("sent", "send"),
    ("sold", "sell"),
    ("spent", "spend"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("taken", "take"),
    ("taught", "teach"),
    ("thought", "think"),
    ("took", "take"),
    ("understood", "understand"),
    ("used", "use"),
    ("using", "use"),
    ("won", "win"),
    ("wrote", "write"),
    ("written", "write"),
];

const ADJECTIVE_EXCEPTIONS: &[(&str, &str)] = &[
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
];

const VOWELS: &[u8] = b"aeiou";

/// Lemmatizes a lower-cased token under the given word class.
pub fn lemmatize(token: &str, class: WordClass) -> String {
    if !token.chars().all(|c| c.is_ascii_alphabetic()) {
        return token.to_string();
    }

    let exceptions = match class {
        WordClass::Noun => NOUN_EXCEPTIONS,
        WordClass::Verb => VERB_EXCEPTIONS,
        WordClass::Adjective => ADJECTIVE_EXCEPTIONS,
        WordClass::Adverb => &[],
    };
    if let Some((_, lemma)) = exceptions.iter().find(|(form, _)| *form == token) {
        return (*lemma).to_string();
    }

    match class {
        WordClass::Noun => lemmatize_noun(token),
        WordClass::Verb => lemmatize_verb(token),
        WordClass::Adjective | WordClass::Adverb => token.to_string(),
    }
}

fn lemmatize_noun(token: &str) -> String {
    if token.len() < 4 {
        return token.to_string();
    }
    if let Some(stem) = token.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "ches", "shes", "xes", "zzes"] {
        if token.ends_with(suffix) {
            return token[..token.len() - 2].to_string();
        }
    }
    if token.ends_with('s') && !["ss", "us", "is", "os"].iter().any(|s| token.ends_with(s)) {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

fn lemmatize_verb(token: &str) -> String {
    if let Some(stem) = token.strip_suffix("ied") {
        if stem.len() >= 2 {
            return format!("{stem}y");
        }
    }
    for suffix in ["ing", "ed"] {
        if let Some(stem) = token.strip_suffix(suffix) {
            if stem.len() >= 2 && stem.bytes().any(|b| VOWELS.contains(&b) || b == b'y') {
                let lemma = repair_stem(stem);
                // a plural-shaped stem would be cut again once re-tagged as a noun
                if is_plural_shaped(&lemma) {
                    return token.to_string();
                }
                return lemma;
            }
        }
    }
    if let Some(stem) = token.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "ches", "shes", "xes"] {
        if token.ends_with(suffix) {
            return token[..token.len() - 2].to_string();
        }
    }
    if token.len() >= 4 && token.ends_with('s') && !token.ends_with("ss") {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

/// Restores the base form of a verb stem left after removing `-ed`/`-ing`.
fn repair_stem(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    let last = bytes[n - 1];
    let prev = bytes[n - 2];

    // plann -> plan, shipp -> ship; but install, pass, buzz, staff stay
    if n > 3 && last == prev && !is_vowel(last) && !matches!(last, b'l' | b's' | b'z' | b'f') {
        return stem[..n - 1].to_string();
    }

    if needs_trailing_e(bytes) {
        return format!("{stem}e");
    }
    stem.to_string()
}

fn needs_trailing_e(bytes: &[u8]) -> bool {
    let n = bytes.len();
    let last = bytes[n - 1];
    let prev = bytes[n - 2];
    let before = if n >= 3 { Some(bytes[n - 3]) } else { None };

    match last {
        // solv, improv, achiev
        b'v' => true,
        // issu, valu, argu
        b'u' => !is_vowel(prev),
        // optimiz, analyz
        b'z' => prev != b'z',
        // produc, reduc, sourc, experienc
        b'c' => is_vowel(prev) || matches!(prev, b'r' | b'n'),
        // manag, merg, chang, acknowledg
        b'g' => {
            is_vowel(prev)
                || matches!(prev, b'r' | b'd')
                || (prev == b'n' && before == Some(b'a'))
        }
        // rais, increas, caus, supervis, clos, licens, revers, collaps, analys
        b's' => {
            (is_vowel(prev) && before.is_some_and(is_vowel))
                || (matches!(prev, b'i' | b'o' | b'y') && before.is_some_and(|b| !is_vowel(b)))
                || matches!(prev, b'n' | b'r' | b'p')
        }
        // requir, configur, ensur
        b'r' => matches!(prev, b'i' | b'u') && before != Some(b'o'),
        // automat, comput, execut, writ, vot
        b't' => {
            (matches!(prev, b'a' | b'u') && before.is_some_and(|b| !is_vowel(b)))
                || (n <= 4
                    && !is_vowel(bytes[0])
                    && is_vowel(prev)
                    && before.is_some_and(|b| !is_vowel(b)))
        }
        // provid, decid, includ
        b'd' => is_vowel(prev) && before.is_some_and(|b| !is_vowel(b)) && prev != b'e',
        // mak, lik, tak
        b'k' => is_vowel(prev) && before.is_some_and(|b| !is_vowel(b) && b != b'c'),
        // enabl, handl, schedul
        b'l' => {
            (!is_vowel(prev) && prev != b'l')
                || (prev == b'u' && before.is_some_and(|b| !is_vowel(b)))
        }
        // combin, defin, determin
        b'n' => prev == b'i' && before.is_some_and(|b| !is_vowel(b)) && n > 4,
        _ => false,
    }
}

fn is_vowel(b: u8) -> bool {
    VOWELS.contains(&b)
}
