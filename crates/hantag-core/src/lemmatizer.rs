//! Stem/ending restoration for Korean irregular conjugation.
//!
//! Given a surface split `(stem, ending)`, `lemma_candidates` proposes
//! canonical `(stem, ending)` pairs a dictionary lookup can validate,
//! e.g. `깨달 + 아 -> 깨닫 + 아` or `했 + 다 -> 하 + 았다`. Every rule is
//! tested independently; all rules that fire contribute a candidate.
//! Nothing here consults a dictionary.

use tracing::trace;

use crate::jamo::{compose, decompose, JamoError, Syllable};

/// The decomposed view of one split shared by all rules.
struct Split<'a> {
    ending: &'a str,
    /// `stem` without its last character.
    front: &'a str,
    last_char: char,
    last: Syllable,
    /// First syllable of `ending`, if it has one.
    first: Option<Syllable>,
    /// `ending` without its first character.
    rest: &'a str,
}

impl Split<'_> {
    /// The syllable before `last_char`, if any.
    fn penultimate(&self) -> Option<char> {
        self.front.chars().next_back()
    }

    /// First syllable of the ending with its trailing consonant removed.
    fn first_open(&self) -> Option<char> {
        self.first.and_then(|f| f.with_trailing(None).ok())
    }

    fn restem(&self, last: char) -> String {
        let mut s = String::with_capacity(self.front.len() + 4);
        s.push_str(self.front);
        s.push(last);
        s
    }
}

type Rule = fn(&Split<'_>, &mut Candidates) -> Result<(), JamoError>;

/// Rule table, applied in order. Order only affects candidate order.
const RULES: &[(&str, Rule)] = &[
    ("d_irregular", d_irregular),
    ("reu_irregular", reu_irregular),
    ("b_irregular", b_irregular),
    ("consonant_ending", consonant_ending),
    ("s_irregular", s_irregular),
    ("u_irregular", u_irregular),
    ("wo_contraction", wo_contraction),
    ("wa_contraction", wa_contraction),
    ("eu_elision", eu_elision),
    ("yeo_irregular", yeo_irregular),
    ("h_irregular", h_irregular),
    ("yeoss_contraction", yeoss_contraction),
];

/// Insertion-ordered, duplicate-free candidate list.
struct Candidates(Vec<(String, String)>);

impl Candidates {
    fn add(&mut self, stem: String, ending: String) {
        if !self.0.iter().any(|(s, e)| *s == stem && *e == ending) {
            self.0.push((stem, ending));
        }
    }
}

/// Propose canonical `(stem, ending)` pairs for a surface split.
///
/// The identity pair always comes first. Rules whose rewrite cannot be
/// composed into a valid syllable are skipped.
pub fn lemma_candidates(stem: &str, ending: &str) -> Vec<(String, String)> {
    let mut out = Candidates(vec![(stem.to_string(), ending.to_string())]);

    let Some(last_char) = stem.chars().next_back() else {
        return out.0;
    };
    let Some(last) = decompose(last_char).syllable() else {
        return out.0;
    };
    let mut ending_chars = ending.chars();
    let first = ending_chars.next().and_then(|c| decompose(c).syllable());
    let split = Split {
        ending,
        front: &stem[..stem.len() - last_char.len_utf8()],
        last_char,
        last,
        first,
        rest: if first.is_some() {
            ending_chars.as_str()
        } else {
            ending
        },
    };

    for (name, rule) in RULES {
        if let Err(e) = rule(&split, &mut out) {
            trace!(rule = name, stem, ending, error = %e, "rule skipped");
        }
    }
    out.0
}

fn has_trailing(s: &Syllable, set: &[Option<char>]) -> bool {
    set.contains(&s.trailing)
}

/// 깨달 + 아 -> 깨닫 + 아
fn d_irregular(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    if sp.last.trailing == Some('ㄹ') && sp.first.is_some_and(|f| f.lead == 'ㅇ') {
        out.add(sp.restem(sp.last.with_trailing(Some('ㄷ'))?), sp.ending.to_string());
    }
    Ok(())
}

/// 굴 + 러 -> 구르 + 어
fn reu_irregular(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    let Some(first) = sp.first else {
        return Ok(());
    };
    if sp.last.trailing == Some('ㄹ') && matches!(sp.first_open(), Some('러' | '라')) {
        let mut stem = sp.restem(sp.last.with_trailing(None)?);
        stem.push('르');
        let ending = format!("{}{}", compose('ㅇ', first.vowel, first.trailing)?, sp.rest);
        out.add(stem, ending);
    }
    Ok(())
}

/// 더러 + 워서 -> 더럽 + 어서
fn b_irregular(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    let Some(first) = sp.first else {
        return Ok(());
    };
    let vowel = match sp.first_open() {
        Some('워') => 'ㅓ',
        Some('와') => 'ㅏ',
        _ => return Ok(()),
    };
    if sp.last.trailing.is_none() {
        let ending = format!("{}{}", compose('ㅇ', vowel, first.trailing)?, sp.rest);
        out.add(sp.restem(sp.last.with_trailing(Some('ㅂ'))?), ending);
    }
    Ok(())
}

/// The ending starts with the stem's trailing consonant: 입 + 니다 -> 이 + ㅂ니다
fn consonant_ending(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    if let Some(t @ ('ㄴ' | 'ㄹ' | 'ㅂ' | 'ㅆ')) = sp.last.trailing {
        out.add(sp.restem(sp.last.with_trailing(None)?), format!("{t}{}", sp.ending));
    }
    Ok(())
}

/// 부 + 어 -> 붓 + 어, except 벗 which is regular
fn s_irregular(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    if sp.last.trailing.is_none()
        && sp.last_char != '벗'
        && sp.first.is_some_and(|f| f.lead == 'ㅇ')
    {
        out.add(sp.restem(sp.last.with_trailing(Some('ㅅ'))?), sp.ending.to_string());
    }
    Ok(())
}

/// 똥퍼 + "" -> 똥푸 + 어
fn u_irregular(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    if sp.last.with_trailing(None)? == '퍼' {
        let ending = format!(
            "{}{}",
            compose('ㅇ', sp.last.vowel, sp.last.trailing)?,
            sp.ending
        );
        out.add(sp.restem('푸'), ending);
    }
    Ok(())
}

/// 줬 + 어 -> 주 + 었어
fn wo_contraction(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    if sp.last.vowel == 'ㅝ' {
        let stem = sp.restem(compose(sp.last.lead, 'ㅜ', None)?);
        let ending = format!("{}{}", compose('ㅇ', 'ㅓ', sp.last.trailing)?, sp.ending);
        out.add(stem, ending);
    }
    Ok(())
}

/// 왔 + 어 -> 오 + 았어
fn wa_contraction(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    if sp.last.vowel == 'ㅘ' {
        let stem = sp.restem(compose(sp.last.lead, 'ㅗ', None)?);
        let ending = format!("{}{}", compose('ㅇ', 'ㅏ', sp.last.trailing)?, sp.ending);
        out.add(stem, ending);
    }
    Ok(())
}

/// 꺼 + "" -> 끄 + 어, 텄 + 어 -> 트 + 었어
fn eu_elision(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    if matches!(sp.last.vowel, 'ㅓ' | 'ㅏ') {
        let stem = sp.restem(compose(sp.last.lead, 'ㅡ', None)?);
        let ending = format!(
            "{}{}",
            compose('ㅇ', sp.last.vowel, sp.last.trailing)?,
            sp.ending
        );
        out.add(stem, ending);
    }
    Ok(())
}

/// 했 + 다 -> 하 + 았다, 해 + 라니깐 -> 하 + 아라니깐
fn yeo_irregular(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    if sp.last.lead == 'ㅎ' && sp.last.vowel == 'ㅐ' {
        let ending = format!("{}{}", compose('ㅇ', 'ㅏ', sp.last.trailing)?, sp.ending);
        out.add(sp.restem('하'), ending);
    }
    Ok(())
}

/// ㅎ drop (파라 + 면 -> 파랗 + 면) and ㅎ contraction
/// (파랬 + 다 -> 파랗 + 았다, 시퍼렜 + 다 -> 시퍼렇 + 었다, 그래 -> 그렇 + 아).
fn h_irregular(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    if !has_trailing(
        &sp.last,
        &[None, Some('ㄴ'), Some('ㄹ'), Some('ㅂ'), Some('ㅆ')],
    ) {
        return Ok(());
    }
    match sp.last.vowel {
        'ㅏ' | 'ㅓ' => {
            let stem = sp.restem(sp.last.with_trailing(Some('ㅎ'))?);
            let ending = match sp.last.trailing {
                None => sp.ending.to_string(),
                Some(t) => format!("{t}{}", sp.ending),
            };
            out.add(stem, ending);
        }
        v @ ('ㅐ' | 'ㅔ') => {
            let open = if v == 'ㅔ' { 'ㅓ' } else { 'ㅏ' };
            let stem = if sp.penultimate() == Some('그') && sp.last.lead == 'ㄹ' {
                sp.restem('렇')
            } else {
                sp.restem(compose(sp.last.lead, open, Some('ㅎ'))?)
            };
            let ending = format!("{}{}", compose('ㅇ', open, sp.last.trailing)?, sp.ending);
            out.add(stem, ending);
        }
        _ => {}
    }
    Ok(())
}

/// 이었 -> 였: 좋아졌 + 어 -> 좋아지 + 었어. A ㅅ trailing written for ㅆ
/// is accepted too.
fn yeoss_contraction(sp: &Split<'_>, out: &mut Candidates) -> Result<(), JamoError> {
    let yeo = sp.last.vowel == 'ㅕ' && has_trailing(&sp.last, &[Some('ㅆ'), Some('ㅅ'), None]);
    if yeo || sp.last.vowel == 'ㅓ' {
        let stem = sp.restem(compose(sp.last.lead, 'ㅣ', None)?);
        let ending = format!("{}{}", compose('ㅇ', 'ㅓ', sp.last.trailing)?, sp.ending);
        out.add(stem, ending);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(stem: &str, ending: &str, want: (&str, &str)) -> bool {
        lemma_candidates(stem, ending)
            .iter()
            .any(|(s, e)| s == want.0 && e == want.1)
    }

    #[test]
    fn test_identity_first() {
        let c = lemma_candidates("먹", "어");
        assert_eq!(c[0], ("먹".to_string(), "어".to_string()));
    }

    #[test]
    fn test_non_hangul_stem_is_identity_only() {
        assert_eq!(
            lemma_candidates("abc", "def"),
            vec![("abc".to_string(), "def".to_string())]
        );
        assert_eq!(lemma_candidates("", "다").len(), 1);
    }

    #[test]
    fn test_no_duplicates() {
        let c = lemma_candidates("했", "다");
        for (i, a) in c.iter().enumerate() {
            assert!(!c[i + 1..].contains(a), "duplicate {a:?}");
        }
    }

    #[test]
    fn test_d_irregular() {
        assert!(has("깨달", "아", ("깨닫", "아")));
    }

    #[test]
    fn test_reu_irregular() {
        assert!(has("굴", "러", ("구르", "어")));
        assert!(has("달", "라서", ("다르", "아서")));
    }

    #[test]
    fn test_b_irregular() {
        assert!(has("더러", "워서", ("더럽", "어서")));
        assert!(has("도", "와", ("돕", "아")));
    }

    #[test]
    fn test_consonant_ending() {
        assert!(has("입", "니다", ("이", "ㅂ니다")));
        assert!(has("간", "다", ("가", "ㄴ다")));
        assert!(has("갔", "다", ("가", "ㅆ다")));
    }

    #[test]
    fn test_s_irregular() {
        assert!(has("부", "어", ("붓", "어")));
        assert!(!has("부", "다", ("붓", "다")));
    }

    #[test]
    fn test_u_irregular() {
        assert!(has("똥퍼", "", ("똥푸", "어")));
    }

    #[test]
    fn test_wo_and_wa_contraction() {
        assert!(has("줬", "어", ("주", "었어")));
        assert!(has("왔", "어", ("오", "았어")));
    }

    #[test]
    fn test_eu_elision() {
        assert!(has("꺼", "", ("끄", "어")));
        assert!(has("텄", "어", ("트", "었어")));
    }

    #[test]
    fn test_yeo_irregular() {
        assert!(has("했", "다", ("하", "았다")));
        assert!(has("해", "라니깐", ("하", "아라니깐")));
    }

    #[test]
    fn test_h_drop() {
        assert!(has("파라", "면", ("파랗", "면")));
        assert!(has("파란", "", ("파랗", "ㄴ")));
    }

    #[test]
    fn test_h_contraction() {
        assert!(has("파랬", "다", ("파랗", "았다")));
        assert!(has("시퍼렜", "다", ("시퍼렇", "었다")));
        assert!(has("그래", "", ("그렇", "아")));
    }

    #[test]
    fn test_yeoss_contraction() {
        assert!(has("좋아졌", "어", ("좋아지", "었어")));
        assert!(has("좋아졋", "던", ("좋아지", "엇던")));
    }

    #[test]
    fn test_ending_starting_with_jamo() {
        // no syllable to inspect on the ending side, stem-side rules still fire
        assert!(has("갔", "ㄴ", ("가", "ㅆㄴ")));
        assert!(!has("달", "ㅇ", ("닫", "ㅇ")));
    }
}
