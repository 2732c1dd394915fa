//! Password generation.
//!
//! Passwords are drawn from up to four fixed category alphabets after removing
//! excluded code points. When every category is required, one character per
//! enabled category seeds the buffer before the random fill, and the whole
//! buffer is then shuffled with Fisher-Yates so the seeded characters carry no
//! positional bias.
//!
//! Every draw goes through `Rng::gen_range`, which rejects out-of-zone samples
//! instead of reducing modulo the range, so selection is uniform. The public
//! entry points use the operating system CSPRNG; the `*_with` variants accept
//! any `CryptoRng` so callers (and tests) can supply their own source.

mod error;

pub use self::error::PasswordError;

use rand::{rngs::OsRng, CryptoRng, Rng, RngCore};
use serde::Serialize;
use std::{collections::HashSet, fmt};
use utoipa::ToSchema;

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 128;
pub const DEFAULT_LENGTH: usize = 16;
pub const MIN_COUNT: usize = 1;
pub const MAX_COUNT: usize = 100;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()-_=+[]{}|;:,.<>?";
/// Visually confusable characters removed when `avoid_ambiguous` is set.
pub const AMBIGUOUS: &str = "Il1O0o";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Uppercase,
    Lowercase,
    Digits,
    Symbols,
}

impl Category {
    /// Fixed category order, used for pool construction and seeding.
    pub const ALL: [Self; 4] = [Self::Uppercase, Self::Lowercase, Self::Digits, Self::Symbols];

    #[must_use]
    pub const fn alphabet(self) -> &'static str {
        match self {
            Self::Uppercase => UPPERCASE,
            Self::Lowercase => LOWERCASE,
            Self::Digits => DIGITS,
            Self::Symbols => SYMBOLS,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Digits => "digits",
            Self::Symbols => "symbols",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub length: usize,
    pub include_upper: bool,
    pub include_lower: bool,
    pub include_digits: bool,
    pub include_symbols: bool,
    pub avoid_ambiguous: bool,
    pub exclude_chars: String,
    pub require_each_category: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            include_upper: true,
            include_lower: true,
            include_digits: true,
            include_symbols: true,
            avoid_ambiguous: false,
            exclude_chars: String::new(),
            require_each_category: true,
        }
    }
}

impl GenerationOptions {
    /// Check the length bounds and that at least one category is enabled.
    ///
    /// # Errors
    /// Returns `InvalidLength` or `NoCategoriesEnabled`.
    pub fn validate(&self) -> Result<(), PasswordError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(PasswordError::InvalidLength {
                min: MIN_LENGTH,
                max: MAX_LENGTH,
                actual: self.length,
            });
        }

        if self.enabled().next().is_none() {
            return Err(PasswordError::NoCategoriesEnabled);
        }

        Ok(())
    }

    #[must_use]
    pub const fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Uppercase => self.include_upper,
            Category::Lowercase => self.include_lower,
            Category::Digits => self.include_digits,
            Category::Symbols => self.include_symbols,
        }
    }

    /// Enabled categories in the fixed `Category::ALL` order.
    pub fn enabled(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL
            .into_iter()
            .filter(move |category| self.is_enabled(*category))
    }

    /// Excluded code points: `exclude_chars` plus the ambiguous set when requested.
    #[must_use]
    pub fn exclusions(&self) -> HashSet<char> {
        let mut excluded: HashSet<char> = self.exclude_chars.chars().collect();
        if self.avoid_ambiguous {
            excluded.extend(AMBIGUOUS.chars());
        }
        excluded
    }
}

/// Filtered per-category alphabets and the combined pool.
#[derive(Debug, Clone)]
pub struct Charsets {
    categories: Vec<(Category, Vec<char>)>,
    pool: Vec<char>,
}

impl Charsets {
    /// Apply exclusions to every enabled category.
    ///
    /// # Errors
    /// Returns the validation errors of `GenerationOptions::validate`, or
    /// `CategoryExhausted` naming the first category left without characters.
    pub fn build(options: &GenerationOptions) -> Result<Self, PasswordError> {
        options.validate()?;

        let excluded = options.exclusions();
        let mut categories = Vec::with_capacity(Category::ALL.len());

        for category in options.enabled() {
            let filtered: Vec<char> = category
                .alphabet()
                .chars()
                .filter(|c| !excluded.contains(c))
                .collect();

            if filtered.is_empty() {
                return Err(PasswordError::CategoryExhausted(category));
            }

            categories.push((category, filtered));
        }

        let pool = categories
            .iter()
            .flat_map(|(_, chars)| chars.iter().copied())
            .collect();

        Ok(Self { categories, pool })
    }

    #[must_use]
    pub fn category(&self, category: Category) -> Option<&[char]> {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, chars)| chars.as_slice())
    }

    #[must_use]
    pub fn pool(&self) -> &[char] {
        &self.pool
    }

    fn iter(&self) -> impl Iterator<Item = (Category, &[char])> {
        self.categories.iter().map(|(c, chars)| (*c, chars.as_slice()))
    }
}

/// Generate one password with the operating system CSPRNG.
///
/// # Errors
/// Returns an input error if the options are invalid, or `Entropy` if the
/// system randomness source cannot be read.
pub fn generate(options: &GenerationOptions) -> Result<String, PasswordError> {
    let charsets = Charsets::build(options)?;
    let mut rng = system_rng()?;
    Ok(fill(&mut rng, options, &charsets))
}

/// Generate one password from the supplied randomness source.
///
/// # Errors
/// Returns an input error if the options are invalid. No randomness is
/// consumed in that case.
pub fn generate_with<R>(rng: &mut R, options: &GenerationOptions) -> Result<String, PasswordError>
where
    R: Rng + CryptoRng,
{
    let charsets = Charsets::build(options)?;
    Ok(fill(rng, options, &charsets))
}

/// Generate `count` independent passwords with the operating system CSPRNG.
///
/// # Errors
/// Returns `InvalidCount` when `count` is outside `[1, 100]`, plus the errors of `generate`.
pub fn generate_multiple(
    count: usize,
    options: &GenerationOptions,
) -> Result<Vec<String>, PasswordError> {
    check_count(count)?;
    (0..count).map(|_| generate(options)).collect()
}

/// Generate `count` independent passwords from the supplied randomness source.
///
/// # Errors
/// Returns `InvalidCount` when `count` is outside `[1, 100]`, plus the errors of `generate_with`.
pub fn generate_multiple_with<R>(
    rng: &mut R,
    count: usize,
    options: &GenerationOptions,
) -> Result<Vec<String>, PasswordError>
where
    R: Rng + CryptoRng,
{
    check_count(count)?;
    (0..count).map(|_| generate_with(rng, options)).collect()
}

/// In-place Fisher-Yates: for `i` from the last index down to 1, swap with a
/// uniform `j` in `[0, i]`.
pub fn shuffle<R, T>(rng: &mut R, items: &mut [T])
where
    R: Rng + CryptoRng,
{
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

fn check_count(count: usize) -> Result<(), PasswordError> {
    if (MIN_COUNT..=MAX_COUNT).contains(&count) {
        Ok(())
    } else {
        Err(PasswordError::InvalidCount {
            min: MIN_COUNT,
            max: MAX_COUNT,
            actual: count,
        })
    }
}

fn fill<R>(rng: &mut R, options: &GenerationOptions, charsets: &Charsets) -> String
where
    R: Rng + CryptoRng,
{
    let mut buffer: Vec<char> = Vec::with_capacity(options.length);

    if options.require_each_category {
        for (_, chars) in charsets.iter() {
            buffer.push(pick(rng, chars));
        }
    }

    let pool = charsets.pool();
    while buffer.len() < options.length {
        buffer.push(pick(rng, pool));
    }

    shuffle(rng, &mut buffer);

    buffer.into_iter().collect()
}

// `chars` is never empty: `Charsets::build` rejects exhausted categories.
fn pick<R>(rng: &mut R, chars: &[char]) -> char
where
    R: Rng + CryptoRng,
{
    chars[rng.gen_range(0..chars.len())]
}

fn system_rng() -> Result<OsRng, PasswordError> {
    let mut probe = [0u8; 1];
    OsRng.try_fill_bytes(&mut probe)?;
    Ok(OsRng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    /// Fails the test if any randomness is requested.
    struct UntouchableRng;

    impl RngCore for UntouchableRng {
        fn next_u32(&mut self) -> u32 {
            panic!("randomness consumed")
        }

        fn next_u64(&mut self) -> u64 {
            panic!("randomness consumed")
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("randomness consumed")
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            panic!("randomness consumed")
        }
    }

    impl CryptoRng for UntouchableRng {}

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    fn contains_any(password: &str, alphabet: &str) -> bool {
        password.chars().any(|c| alphabet.contains(c))
    }

    fn random_options(rng: &mut StdRng) -> GenerationOptions {
        let mut options = GenerationOptions {
            length: rng.gen_range(MIN_LENGTH..=MAX_LENGTH),
            include_upper: rng.gen_bool(0.5),
            include_lower: rng.gen_bool(0.5),
            include_digits: rng.gen_bool(0.5),
            include_symbols: rng.gen_bool(0.5),
            avoid_ambiguous: rng.gen_bool(0.5),
            exclude_chars: String::new(),
            require_each_category: true,
        };
        if options.enabled().next().is_none() {
            options.include_lower = true;
        }
        let everything: Vec<char> = Category::ALL
            .iter()
            .flat_map(|c| c.alphabet().chars())
            .collect();
        for _ in 0..rng.gen_range(0..12) {
            options
                .exclude_chars
                .push(everything[rng.gen_range(0..everything.len())]);
        }
        options
    }

    #[test]
    fn default_options_are_valid() {
        assert!(GenerationOptions::default().validate().is_ok());
    }

    #[test]
    fn length_bounds_are_enforced() {
        for length in [0, 3, 129, 1000] {
            let options = GenerationOptions {
                length,
                ..GenerationOptions::default()
            };
            assert!(matches!(
                options.validate(),
                Err(PasswordError::InvalidLength { actual, .. }) if actual == length
            ));
        }
        for length in [4, 16, 128] {
            let options = GenerationOptions {
                length,
                ..GenerationOptions::default()
            };
            assert!(options.validate().is_ok());
        }
    }

    #[test]
    fn no_categories_is_rejected() {
        let options = GenerationOptions {
            include_upper: false,
            include_lower: false,
            include_digits: false,
            include_symbols: false,
            ..GenerationOptions::default()
        };
        assert!(matches!(
            generate_with(&mut seeded(), &options),
            Err(PasswordError::NoCategoriesEnabled)
        ));
    }

    #[test]
    fn exhausted_category_is_named() {
        let options = GenerationOptions {
            exclude_chars: DIGITS.to_string(),
            ..GenerationOptions::default()
        };
        let result = generate_with(&mut seeded(), &options);
        assert!(matches!(
            result,
            Err(PasswordError::CategoryExhausted(Category::Digits))
        ));
        if let Err(err) = result {
            assert!(err.to_string().contains("digits"));
        }
    }

    #[test]
    fn invalid_requests_consume_no_randomness() {
        let exhausted = GenerationOptions {
            exclude_chars: SYMBOLS.to_string(),
            ..GenerationOptions::default()
        };
        assert!(generate_with(&mut UntouchableRng, &exhausted).is_err());

        let too_short = GenerationOptions {
            length: 2,
            ..GenerationOptions::default()
        };
        assert!(generate_with(&mut UntouchableRng, &too_short).is_err());
        assert!(generate_multiple_with(&mut UntouchableRng, 0, &too_short).is_err());
    }

    #[test]
    fn disabled_category_may_be_fully_excluded() {
        let options = GenerationOptions {
            include_digits: false,
            exclude_chars: DIGITS.to_string(),
            ..GenerationOptions::default()
        };
        let password = generate_with(&mut seeded(), &options).expect("valid options");
        assert!(!contains_any(&password, DIGITS));
    }

    #[test]
    fn exclusion_works_on_code_points() {
        // Multi-byte characters in the exclusion string must not disturb ASCII filtering.
        let options = GenerationOptions {
            include_lower: false,
            include_digits: false,
            include_symbols: false,
            exclude_chars: "é✓ABCDEFGHIJKLMNOPQRSTUVWXY".to_string(),
            ..GenerationOptions::default()
        };
        let password = generate_with(&mut seeded(), &options).expect("Z survives");
        assert_eq!(password, "Z".repeat(DEFAULT_LENGTH));
    }

    #[test]
    fn ambiguous_characters_are_never_emitted() {
        let mut rng = seeded();
        let options = GenerationOptions {
            length: MAX_LENGTH,
            avoid_ambiguous: true,
            ..GenerationOptions::default()
        };
        for _ in 0..200 {
            let password = generate_with(&mut rng, &options).expect("valid options");
            assert!(!contains_any(&password, AMBIGUOUS), "{password}");
        }
    }

    #[test]
    fn generated_passwords_honor_options() {
        let mut rng = seeded();
        let mut checked = 0;
        for _ in 0..500 {
            let options = random_options(&mut rng);
            let password = match generate_with(&mut rng, &options) {
                Ok(password) => password,
                Err(PasswordError::CategoryExhausted(_)) => continue,
                Err(err) => panic!("unexpected error: {err}"),
            };
            checked += 1;

            assert_eq!(password.chars().count(), options.length);

            let excluded = options.exclusions();
            assert!(password.chars().all(|c| !excluded.contains(&c)));

            for category in Category::ALL {
                let present = contains_any(&password, category.alphabet());
                if options.is_enabled(category) {
                    assert!(present, "{category} missing from {password}");
                } else {
                    assert!(!present, "{category} leaked into {password}");
                }
            }
        }
        assert!(checked > 100);
    }

    #[test]
    fn shortest_password_holds_one_of_each_category() {
        let mut rng = seeded();
        let options = GenerationOptions {
            length: MIN_LENGTH,
            ..GenerationOptions::default()
        };
        for _ in 0..100 {
            let password = generate_with(&mut rng, &options).expect("valid options");
            for category in Category::ALL {
                let n = password
                    .chars()
                    .filter(|c| category.alphabet().contains(*c))
                    .count();
                assert_eq!(n, 1, "{category} in {password}");
            }
        }
    }

    #[test]
    fn charsets_keep_category_order() {
        let options = GenerationOptions {
            include_lower: false,
            avoid_ambiguous: true,
            ..GenerationOptions::default()
        };
        let charsets = Charsets::build(&options).expect("valid options");
        assert!(charsets.category(Category::Lowercase).is_none());
        assert_eq!(
            charsets.category(Category::Digits),
            Some(&['2', '3', '4', '5', '6', '7', '8', '9'][..])
        );
        let expected: String = [
            UPPERCASE.replace(&['I', 'O'][..], ""),
            "23456789".to_string(),
            SYMBOLS.to_string(),
        ]
        .concat();
        assert_eq!(charsets.pool().iter().collect::<String>(), expected);
    }

    #[test]
    fn generate_multiple_checks_count() {
        let options = GenerationOptions::default();
        for count in [0, 101] {
            assert!(matches!(
                generate_multiple_with(&mut seeded(), count, &options),
                Err(PasswordError::InvalidCount { actual, .. }) if actual == count
            ));
        }
    }

    #[test]
    fn generate_multiple_returns_count_valid_passwords() {
        let options = GenerationOptions {
            length: 12,
            avoid_ambiguous: true,
            ..GenerationOptions::default()
        };
        let passwords =
            generate_multiple_with(&mut seeded(), MAX_COUNT, &options).expect("valid request");
        assert_eq!(passwords.len(), MAX_COUNT);
        for password in &passwords {
            assert_eq!(password.chars().count(), 12);
            assert!(!contains_any(password, AMBIGUOUS));
        }
    }

    #[test]
    fn os_rng_generation_works() {
        let password = generate(&GenerationOptions::default()).expect("system rng");
        assert_eq!(password.chars().count(), DEFAULT_LENGTH);
        let passwords = generate_multiple(3, &GenerationOptions::default()).expect("system rng");
        assert_eq!(passwords.len(), 3);
    }

    // Pearson chi-square statistic against a uniform expectation.
    fn chi_square(observed: &[u32]) -> f64 {
        let total: u32 = observed.iter().sum();
        let expected = f64::from(total) / observed.len() as f64;
        observed
            .iter()
            .map(|&o| {
                let diff = f64::from(o) - expected;
                diff * diff / expected
            })
            .sum()
    }

    #[test]
    fn shuffle_has_no_positional_bias() {
        let mut rng = seeded();
        let mut positions = [0u32; 8];
        for _ in 0..16_000 {
            let mut items: Vec<usize> = (0..8).collect();
            shuffle(&mut rng, &mut items);
            let at = items.iter().position(|&v| v == 0).expect("element present");
            positions[at] += 1;
        }
        // 7 degrees of freedom; 24.3 is the 0.001 critical value.
        assert!(chi_square(&positions) < 30.0, "{positions:?}");
    }

    #[test]
    fn seeded_category_character_lands_uniformly() {
        // With length 4 and four required categories, the only uppercase
        // character is the seeded one.
        let mut rng = seeded();
        let options = GenerationOptions {
            length: MIN_LENGTH,
            ..GenerationOptions::default()
        };
        let mut positions = [0u32; MIN_LENGTH];
        for _ in 0..8_000 {
            let password: Vec<char> = generate_with(&mut rng, &options)
                .expect("valid options")
                .chars()
                .collect();
            let at = password
                .iter()
                .position(char::is_ascii_uppercase)
                .expect("uppercase present");
            positions[at] += 1;
        }
        // 3 degrees of freedom; 16.3 is the 0.001 critical value.
        assert!(chi_square(&positions) < 25.0, "{positions:?}");
    }

    #[test]
    fn input_errors_are_distinguished_from_internal_ones() {
        assert!(PasswordError::NoCategoriesEnabled.is_input_error());
        assert!(PasswordError::MissingField("password").is_input_error());
    }
}
