
// imports
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};


/// Symbols counted in every post body, in output column order.
pub const SYMBOLS: [char; 26] = ['_', '-', ';', ':', '!', '?', '.', '(', ')', '[', ']', '{', '}', '*', '/',
    '\\', '&', '%', '`', '+', '<', '=', '>', '|', '~', '$'];

lazy_static! {
    static ref FN_REGEX: Regex = Regex::new(r".*fn [[:alpha:]]\w*\(.*\)").unwrap();
    static ref LET_REGEX: Regex = Regex::new(r".*let( mut)? [[:alpha:]]\w*.* = .*;").unwrap();
    static ref IF_LET_REGEX: Regex = Regex::new(r".*if let .* = match").unwrap();
    static ref MACRO_REGEX: Regex = Regex::new(r".*[[:alpha:]]\w*! ?[\{\(\[].*[\)\]\}]").unwrap();
}

fn bool_to_f32(b: bool) -> f32 {
    if b { 1.0 } else { 0.0 }
}

/// One row per text: does it contain a fn, a let binding, an `if let .. = match`
/// and a macro call, as 0/1 values.
pub fn check_for_code(self_texts: &[&str]) -> Vec<Vec<f32>> {

    self_texts
    .par_iter()
    .map(|text| {
        [&*FN_REGEX, &*LET_REGEX, &*IF_LET_REGEX, &*MACRO_REGEX]
        .iter()
        .map(|re| bool_to_f32(re.is_match(text)))
        .collect::<Vec<f32>>()
    })
    .collect()
}

pub fn symbol_counts(self_texts: &[&str]) -> Vec<Vec<f32>> {

    self_texts
    .par_iter()
    .map(|text| {
        let mut char_map: HashMap<char, u64> = SYMBOLS.iter().map(|c| (*c, 0)).collect();
        for ch in text.chars() {
            if let Some(f) = char_map.get_mut(&ch) {
                *f += 1;
            }
        }
        SYMBOLS.iter().map(|symbol| *char_map.get(symbol).unwrap_or(&0) as f32).collect::<Vec<f32>>()
    })
    .collect()
}

fn should_replace(c: u8) -> bool {
    matches!(c, b'.' | b'?' | b'!' | b',' | b':' | b';' | b'(' | b')' | b'{' | b'}' | b']' | b'[' | b'/' | b'=' | b'|' | b'~')
}

fn should_drop(c: u8) -> bool {
    matches!(c, b'\'' | b'"' | b'`' | b'-' | b'_' | b'*' | b'&')
}

fn depluralize(s: &str) -> &str {
    s.strip_suffix('s').unwrap_or(s)
}

/// Lower cased words of 3 to 9 ascii letters, punctuation split, trailing `s` removed.
pub fn get_words(sentence: &str) -> Vec<String> {

    // non ascii characters are removed first, the rest works on bytes
    let cleaned: Vec<u8> = sentence
    .bytes()
    .filter(|c| c.is_ascii())
    .map(|c| if should_replace(c) { b' ' } else { c })
    .filter(|c| !should_drop(*c))
    .map(|c| c.to_ascii_lowercase())
    .collect();
    let cleaned = String::from_utf8_lossy(&cleaned);

    cleaned
    .split_whitespace()
    .filter(|s| 2 < s.len() && s.len() < 10)
    .filter(|s| s.bytes().all(|c| c.is_ascii_lowercase()))
    .map(depluralize)
    .filter(|s| 2 < s.len())
    .map(String::from)
    .collect()
}

/// Counts each word of `words_of_interest` in every text. Columns follow the sorted
/// order of the distinct words.
pub fn interesting_word_freq(self_texts: &[&str], words_of_interest: &[String]) -> Vec<Vec<f32>> {

    let init_map: BTreeMap<&str, u64> = words_of_interest.iter().map(|w| (w.as_str(), 0)).collect();

    self_texts
    .par_iter()
    .map(|text| {
        let mut freq_map = init_map.clone();
        for word in get_words(text) {
            if let Some(f) = freq_map.get_mut(word.as_str()) {
                *f += 1;
            }
        }
        freq_map.into_values().map(|count| count as f32).collect::<Vec<f32>>()
    })
    .collect()
}

/// Numbers subreddits in order of first appearance.
pub fn subs_to_float(subs: &[&str]) -> Vec<f32> {

    let mut sub_float_map: HashMap<&str, usize> = HashMap::new();
    subs
    .iter()
    .map(|sub| {
        let next = sub_float_map.len();
        *sub_float_map.entry(*sub).or_insert(next) as f32
    })
    .collect()
}
