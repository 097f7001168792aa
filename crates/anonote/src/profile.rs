use anostr::Pubkey;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The content of a kind-0 profile metadata note. Every field is
/// optional on the wire; absent fields are not serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nip05: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lud16: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lud06: Option<String>,
}

impl ProfileRecord {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

const DICEBEAR_STYLES: &[&str] = &[
    "adventurer",
    "adventurer-neutral",
    "big-ears",
    "big-ears-neutral",
    "big-smile",
    "bottts",
    "bottts-neutral",
    "croodles",
    "croodles-neutral",
    "fun-emoji",
    "icons",
    "identicon",
    "lorelei",
    "lorelei-neutral",
    "micah",
    "miniavs",
    "open-peeps",
    "personas",
    "pixel-art",
    "pixel-art-neutral",
    "shapes",
    "thumbs",
];

/// All avatar urls a minted profile may carry. Parameterizing on the
/// pubkey keeps the rendered avatar stable per identity without any
/// network call of our own.
fn avatar_candidates(pubkey: &Pubkey) -> Vec<String> {
    let hex = pubkey.hex();
    let mut candidates = vec![
        format!("https://robohash.org/{hex}.png"),
        format!(
            "https://ui-avatars.com/api/?name={}&background=random",
            &hex[..6]
        ),
    ];

    for style in DICEBEAR_STYLES {
        candidates.push(format!(
            "https://api.dicebear.com/9.x/{style}/png?seed={hex}"
        ));
    }

    candidates
}

/// Mint the throwaway profile that accompanies one ephemeral identity:
/// a pronounceable invented name, a random avatar and a nonsense bio.
pub fn mint_anon_profile<R: Rng>(rng: &mut R, pubkey: &Pubkey) -> ProfileRecord {
    let candidates = avatar_candidates(pubkey);
    let picture = candidates[rng.random_range(0..candidates.len())].clone();

    ProfileRecord {
        name: Some(capitalize(&random_word(rng))),
        picture: Some(picture),
        about: Some(random_sentence(rng)),
        ..ProfileRecord::default()
    }
}

fn random_syllable<R: Rng>(rng: &mut R) -> String {
    const CONSONANTS: &[u8] = b"bcdfghjklmnpqrstvwxyz";
    const VOWELS: &[u8] = b"aeiou";

    let consonant = CONSONANTS[rng.random_range(0..CONSONANTS.len())] as char;
    let vowel = VOWELS[rng.random_range(0..VOWELS.len())] as char;
    format!("{consonant}{vowel}")
}

/// A readable word of 2 to 3 syllables.
fn random_word<R: Rng>(rng: &mut R) -> String {
    let syllables = rng.random_range(2..=3);
    (0..syllables).map(|_| random_syllable(rng)).collect()
}

/// A nonsense sentence of 5 to 9 words.
fn random_sentence<R: Rng>(rng: &mut R) -> String {
    let words = rng.random_range(5..=9);
    let sentence = (0..words)
        .map(|_| random_word(rng))
        .collect::<Vec<_>>()
        .join(" ");

    format!("{}.", capitalize(&sentence))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anostr::FullKeypair;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn minting_is_deterministic_under_a_seed() {
        let pubkey = FullKeypair::generate().pubkey;

        let a = mint_anon_profile(&mut StdRng::seed_from_u64(7), &pubkey);
        let b = mint_anon_profile(&mut StdRng::seed_from_u64(7), &pubkey);
        assert_eq!(a, b);
    }

    #[test]
    fn minted_profile_shape() {
        let pubkey = FullKeypair::generate().pubkey;
        let profile = mint_anon_profile(&mut StdRng::seed_from_u64(42), &pubkey);

        let name = profile.name.as_deref().expect("name");
        assert!(name.chars().next().expect("nonempty").is_uppercase());
        assert!(name.len() >= 4 && name.len() <= 6, "2-3 syllables: {name}");

        let about = profile.about.as_deref().expect("about");
        assert!(about.ends_with('.'));
        let word_count = about.split_whitespace().count();
        assert!((5..=9).contains(&word_count), "about: {about}");

        let picture = profile.picture.as_deref().expect("picture");
        assert!(avatar_candidates(&pubkey).contains(&picture.to_owned()));
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let pubkey = FullKeypair::generate().pubkey;
        let profile = mint_anon_profile(&mut StdRng::seed_from_u64(1), &pubkey);

        let json = profile.to_json().expect("json");
        assert!(!json.contains("banner"));
        assert!(!json.contains("lud16"));

        let parsed = ProfileRecord::from_json(&json).expect("parse");
        assert_eq!(parsed, profile);
    }

    #[test]
    fn parses_remote_profiles_with_extra_fields() {
        let parsed = ProfileRecord::from_json(
            r#"{"name":"fiatjaf","nip05":"_@fiatjaf.com","website":"https://example.com"}"#,
        )
        .expect("parse");
        assert_eq!(parsed.name.as_deref(), Some("fiatjaf"));
        assert_eq!(parsed.nip05.as_deref(), Some("_@fiatjaf.com"));
    }
}
