//! Script coverage from the character map.
//!
//! Each script is checked against a curated set of code points that a font
//! must map to be usable for that writing system. The sets are deliberately
//! small: the basic alphabet for alphabetic scripts and a sample of the most
//! frequent characters for the large East Asian repertoires.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A writing system evaluated by the coverage analyzer.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Script {
    Latin,
    Greek,
    Cyrillic,
    Armenian,
    Hebrew,
    Arabic,
    Devanagari,
    Thai,
    Georgian,
    Hangul,
    Kana,
    Han,
}

impl Script {
    pub const ALL: [Script; 12] = [
        Script::Latin,
        Script::Greek,
        Script::Cyrillic,
        Script::Armenian,
        Script::Hebrew,
        Script::Arabic,
        Script::Devanagari,
        Script::Thai,
        Script::Georgian,
        Script::Hangul,
        Script::Kana,
        Script::Han,
    ];

    /// Scripts evaluated unless configured otherwise.
    pub const COMMON: [Script; 10] = [
        Script::Latin,
        Script::Greek,
        Script::Cyrillic,
        Script::Hebrew,
        Script::Arabic,
        Script::Devanagari,
        Script::Thai,
        Script::Hangul,
        Script::Kana,
        Script::Han,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Latin => "Latin",
            Self::Greek => "Greek",
            Self::Cyrillic => "Cyrillic",
            Self::Armenian => "Armenian",
            Self::Hebrew => "Hebrew",
            Self::Arabic => "Arabic",
            Self::Devanagari => "Devanagari",
            Self::Thai => "Thai",
            Self::Georgian => "Georgian",
            Self::Hangul => "Hangul",
            Self::Kana => "Kana",
            Self::Han => "Han",
        }
    }

    /// ISO 15924 code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Latin => "Latn",
            Self::Greek => "Grek",
            Self::Cyrillic => "Cyrl",
            Self::Armenian => "Armn",
            Self::Hebrew => "Hebr",
            Self::Arabic => "Arab",
            Self::Devanagari => "Deva",
            Self::Thai => "Thai",
            Self::Georgian => "Geor",
            Self::Hangul => "Hang",
            Self::Kana => "Hrkt",
            Self::Han => "Hani",
        }
    }

    /// The code points a font must map to support this script.
    pub fn required(self) -> BTreeSet<u32> {
        let (ranges, chars) = self.repertoire();
        ranges
            .iter()
            .flat_map(|(start, end)| *start..=*end)
            .chain(chars.chars().map(u32::from))
            .collect()
    }

    fn repertoire(self) -> (&'static [(u32, u32)], &'static str) {
        match self {
            Self::Latin => (&[(0x41, 0x5A), (0x61, 0x7A)], ""),
            // Capital letters without the unassigned U+03A2.
            Self::Greek => (&[(0x391, 0x3A1), (0x3A3, 0x3A9), (0x3B1, 0x3C9)], ""),
            Self::Cyrillic => (&[(0x410, 0x44F), (0x401, 0x401), (0x451, 0x451)], ""),
            Self::Armenian => (&[(0x531, 0x556), (0x561, 0x586)], ""),
            Self::Hebrew => (&[(0x5D0, 0x5EA)], ""),
            Self::Arabic => (&[(0x621, 0x63A), (0x641, 0x64A)], ""),
            Self::Devanagari => (&[(0x905, 0x939)], ""),
            Self::Thai => (&[(0xE01, 0xE2E)], ""),
            Self::Georgian => (&[(0x10D0, 0x10F0)], ""),
            // Compatibility jamo and frequent syllables.
            Self::Hangul => (
                &[(0x3131, 0x314E)],
                "가나다라마바사아자차카타파하한국어글을는",
            ),
            // Hiragana and katakana.
            Self::Kana => (&[(0x3042, 0x3093), (0x30A2, 0x30F3)], ""),
            Self::Han => (&[], HAN_COMMON),
        }
    }
}

/// Frequently used ideographs.
const HAN_COMMON: &str = "的一是不了人我在有他这中大来上国个到说们为子和你地出道也时年得就那要下以生会自着去之过家学对可她里后小么心多天而能好都然没日于起还发成事只作当想看文无开手十用主行方又如前所本见经头面公同三已老从动两长知民样现分将外但身些与高意进把法此实回二理美点月明";

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for a script name or code that is not recognized.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct UnknownScript(pub String);

impl fmt::Display for UnknownScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown script '{}'", self.0)
    }
}

impl std::error::Error for UnknownScript {}

impl FromStr for Script {
    type Err = UnknownScript;

    /// Accepts the script name or its ISO 15924 code, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if ["Hira", "Kana", "Hiragana", "Katakana"]
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(s))
        {
            return Ok(Self::Kana);
        }
        Self::ALL
            .into_iter()
            .find(|script| {
                script.name().eq_ignore_ascii_case(s) || script.code().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| UnknownScript(s.to_string()))
    }
}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Level of support for a script.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportStatus {
    /// More than 90% covered.
    Full,
    /// More than 50% covered.
    Partial,
    /// More than 10% covered.
    Minimal,
    /// Some coverage.
    Limited,
    None,
}

impl SupportStatus {
    pub fn from_percentage(percentage: f32) -> Self {
        if percentage > 90.0 {
            Self::Full
        } else if percentage > 50.0 {
            Self::Partial
        } else if percentage > 10.0 {
            Self::Minimal
        } else if percentage > 0.0 {
            Self::Limited
        } else {
            Self::None
        }
    }
}

/// Coverage of a single script.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct ScriptCoverage {
    pub script: Script,
    pub covered: usize,
    pub required: usize,
    pub percentage: f32,
    pub status: SupportStatus,
    /// Unmapped required code points in ascending order, formatted as
    /// `U+XXXX`, truncated to the configured limit.
    pub missing: Vec<String>,
}

/// Coverage of all requested scripts.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct ScriptAnalysis {
    pub scripts: Vec<ScriptCoverage>,
    /// Best covered script, if any script is covered at all.
    pub primary_script: Option<Script>,
    pub fully_supported: usize,
    pub partially_supported: usize,
    /// Number of code points mapped by the font.
    pub mapped_code_points: usize,
}

impl ScriptAnalysis {
    pub fn get(&self, script: Script) -> Option<&ScriptCoverage> {
        self.scripts.iter().find(|coverage| coverage.script == script)
    }
}

pub fn script_coverage(
    code_points: &BTreeSet<u32>,
    script: Script,
    missing_limit: usize,
) -> ScriptCoverage {
    let required = script.required();
    let covered = required.intersection(code_points).count();
    let percentage = if required.is_empty() {
        0.0
    } else {
        (100.0 * covered as f64 / required.len() as f64) as f32
    };
    let missing = required
        .difference(code_points)
        .take(missing_limit)
        .map(|code_point| format!("U+{code_point:04X}"))
        .collect();
    ScriptCoverage {
        script,
        covered,
        required: required.len(),
        percentage,
        status: SupportStatus::from_percentage(percentage),
        missing,
    }
}

/// Evaluates every script in `scripts`, in script order.
pub fn analyze_coverage(
    code_points: &BTreeSet<u32>,
    scripts: &BTreeSet<Script>,
    missing_limit: usize,
) -> ScriptAnalysis {
    let scripts: Vec<_> = scripts
        .iter()
        .map(|script| script_coverage(code_points, *script, missing_limit))
        .collect();
    let mut primary: Option<&ScriptCoverage> = None;
    for coverage in scripts.iter().filter(|coverage| coverage.covered > 0) {
        if primary.is_none_or(|best| coverage.percentage > best.percentage) {
            primary = Some(coverage);
        }
    }
    let count = |status| scripts.iter().filter(|c| c.status == status).count();
    ScriptAnalysis {
        primary_script: primary.map(|coverage| coverage.script),
        fully_supported: count(SupportStatus::Full),
        partially_supported: count(SupportStatus::Partial),
        mapped_code_points: code_points.len(),
        scripts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn latin_only() -> BTreeSet<u32> {
        ('A'..='Z').chain('a'..='z').map(u32::from).collect()
    }

    #[test]
    fn curated_set_sizes() {
        let sizes: Vec<_> = [
            Script::Latin,
            Script::Greek,
            Script::Cyrillic,
            Script::Hebrew,
            Script::Arabic,
            Script::Thai,
        ]
        .iter()
        .map(|script| script.required().len())
        .collect();
        assert_eq!(sizes, [52, 49, 66, 27, 36, 46]);
        assert!(!Script::Greek.required().contains(&0x3A2));
        assert_eq!(Script::Han.required().len(), HAN_COMMON.chars().count());
    }

    #[test]
    fn parse_names_and_codes() {
        assert_eq!("Cyrillic".parse::<Script>(), Ok(Script::Cyrillic));
        assert_eq!("cyrl".parse::<Script>(), Ok(Script::Cyrillic));
        assert_eq!("Hira".parse::<Script>(), Ok(Script::Kana));
        assert_eq!("Hani".parse::<Script>(), Ok(Script::Han));
        assert_eq!(
            "Klingon".parse::<Script>(),
            Err(UnknownScript("Klingon".into()))
        );
    }

    #[test]
    fn latin_font_against_latin_and_cyrillic() {
        let scripts = [Script::Latin, Script::Cyrillic].into_iter().collect();
        let analysis = analyze_coverage(&latin_only(), &scripts, 16);
        let latin = analysis.get(Script::Latin).unwrap();
        assert_eq!((latin.covered, latin.required), (52, 52));
        assert_eq!(latin.percentage, 100.0);
        assert_eq!(latin.status, SupportStatus::Full);
        assert!(latin.missing.is_empty());
        let cyrillic = analysis.get(Script::Cyrillic).unwrap();
        assert_eq!(cyrillic.covered, 0);
        assert_eq!(cyrillic.percentage, 0.0);
        assert_eq!(cyrillic.status, SupportStatus::None);
        assert_eq!(cyrillic.missing.len(), 16);
        assert_eq!(cyrillic.missing[0], "U+0401");
        assert_eq!(cyrillic.missing[1], "U+0410");
        assert_eq!(analysis.primary_script, Some(Script::Latin));
        assert_eq!(analysis.fully_supported, 1);
    }

    #[test]
    fn partial_coverage_statuses() {
        let mut code_points = latin_only();
        // first 40 of 66 Cyrillic letters
        code_points.extend(Script::Cyrillic.required().into_iter().take(40));
        let coverage = script_coverage(&code_points, Script::Cyrillic, 100);
        assert_eq!(coverage.covered, 40);
        assert_eq!(coverage.status, SupportStatus::Partial);
        assert_eq!(coverage.missing.len(), 26);
        assert_eq!(SupportStatus::from_percentage(90.0), SupportStatus::Partial);
        assert_eq!(SupportStatus::from_percentage(10.5), SupportStatus::Minimal);
        assert_eq!(SupportStatus::from_percentage(0.1), SupportStatus::Limited);
    }

    #[test]
    fn primary_ties_go_to_earlier_script() {
        let mut code_points = BTreeSet::new();
        code_points.insert(0x5D0);
        code_points.extend(Script::Cyrillic.required());
        code_points.extend(Script::Greek.required());
        let analysis = analyze_coverage(&code_points, &Script::ALL.into_iter().collect(), 4);
        assert_eq!(analysis.primary_script, Some(Script::Greek));
        assert_eq!(analysis.fully_supported, 2);
        for coverage in &analysis.scripts {
            assert!((0.0..=100.0).contains(&coverage.percentage));
            assert!(coverage.covered <= coverage.required);
            assert!(coverage.missing.len() <= 4);
        }
    }

    #[test]
    fn nothing_mapped_has_no_primary() {
        let analysis = analyze_coverage(
            &BTreeSet::new(),
            &Script::COMMON.into_iter().collect(),
            16,
        );
        assert_eq!(analysis.primary_script, None);
        assert_eq!(analysis.scripts.len(), Script::COMMON.len());
    }
}
