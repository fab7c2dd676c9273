//! Test data: generated users and contact messages, JSON data files and
//! per-scenario rows.

use crate::config::DataFiles;
use crate::logging;
use crate::result::{ShopError, ShopResult};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;
use uuid::Uuid;

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Olivia", "Liam", "Priya", "Noah", "Mei", "Lucas", "Ana", "Ethan", "Zara", "Mateo",
    "Hana", "Oliver", "Isla", "Ravi", "Sofia",
];
const LAST_NAMES: &[&str] = &[
    "Sharma", "Smith", "Garcia", "Chen", "Patel", "Johnson", "Kim", "Silva", "Brown", "Singh",
    "Nguyen", "Martin", "Wilson", "Khan",
];
const COMPANIES: &[&str] = &[
    "Northwind Traders", "Acme Corp", "Globex", "Initech", "Umbrella Retail", "Stark Supplies",
    "Wayne Textiles", "Hooli",
];
const STREETS: &[&str] = &[
    "MG Road", "Park Street", "Baker Street", "Elm Avenue", "Lake View Road", "Station Road",
    "Hill Crest Lane", "Market Street",
];
const STATES: &[&str] = &[
    "Delhi", "Maharashtra", "Karnataka", "Tamil Nadu", "Gujarat", "Kerala", "Punjab", "Rajasthan",
];
const CITIES: &[&str] = &[
    "New Delhi", "Mumbai", "Bengaluru", "Chennai", "Ahmedabad", "Kochi", "Amritsar", "Jaipur",
];
const SUBJECTS: &[&str] = &[
    "Question about my order",
    "Delivery status enquiry",
    "Product size information",
    "Feedback on checkout",
    "Return request",
    "Bulk order enquiry",
];
const MESSAGE_WORDS: &[&str] = &[
    "order", "delivery", "product", "size", "colour", "please", "help", "thanks", "quality",
    "return", "payment", "shipping", "website", "cart", "discount", "team",
];
/// Password given to generated accounts
pub const DEFAULT_PASSWORD: &str = "Test123456";
/// Email of the pre-registered account used by login checks
pub const VALID_USER_EMAIL: &str = "testuser@example.com";

/// Month names as the birth-date dropdown lists them
pub const MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Products listed in the storefront catalogue
pub const PRODUCT_NAMES: &[&str] = &[
    "Blue Top",
    "Men Tshirt",
    "Sleeveless Dress",
    "Stylish Dress",
    "Winter Top",
];

/// Terms known to return results in the catalogue search
pub const SEARCH_TERMS: &[&str] = &[
    "top", "dress", "tshirt", "jeans", "saree", "kids", "women", "men",
];

/// A registrable account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestUser {
    /// Display name used on the signup form
    pub name: String,
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
    /// `Mr` or `Mrs`
    pub title: String,
    /// Day of birth, `1`..=`28`
    pub birth_day: String,
    /// Month of birth as shown in the dropdown
    pub birth_month: String,
    /// Year of birth
    pub birth_year: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Company
    pub company: String,
    /// Street address
    pub address: String,
    /// Second address line
    pub address2: String,
    /// Country as shown in the dropdown
    pub country: String,
    /// State
    pub state: String,
    /// City
    pub city: String,
    /// Postal code
    pub zipcode: String,
    /// Mobile number
    pub mobile_number: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: DEFAULT_PASSWORD.to_string(),
            title: "Mr".to_string(),
            birth_day: "1".to_string(),
            birth_month: "January".to_string(),
            birth_year: "1990".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            company: String::new(),
            address: String::new(),
            address2: String::new(),
            country: "India".to_string(),
            state: String::new(),
            city: String::new(),
            zipcode: String::new(),
            mobile_number: String::new(),
        }
    }
}

impl TestUser {
    /// `first last`, or `name` when set
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("{} {}", self.first_name, self.last_name).trim().to_string()
        } else {
            self.name.clone()
        }
    }
}

/// A contact-us submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Subject line
    pub subject: String,
    /// Body
    pub message: String,
}

/// Reads and generates the data a scenario needs
#[derive(Debug, Clone, Default)]
pub struct DataManager {
    files: DataFiles,
}

impl DataManager {
    /// Data manager over the configured files
    #[must_use]
    pub const fn new(files: DataFiles) -> Self {
        Self { files }
    }

    /// Data manager with the default file names under `dir`
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(DataFiles {
            users_file: dir.join("users.json"),
            products_file: dir.join("products.json"),
            scenarios_file: dir.join("test_data.json"),
        })
    }

    /// Configured files
    #[must_use]
    pub const fn files(&self) -> &DataFiles {
        &self.files
    }

    // ------------------------------------------------------------------
    // JSON files
    // ------------------------------------------------------------------

    /// JSON document at `path`; a missing file reads as `{}`
    pub fn load_json(&self, path: &Path) -> ShopResult<Value> {
        if !path.exists() {
            tracing::warn!(target: "shopcheck::data", path = %path.display(), "JSON file not found");
            return Ok(Value::Object(Map::new()));
        }
        let text = std::fs::read_to_string(path)?;
        let value = serde_json::from_str(&text).map_err(|e| {
            ShopError::data(format!("cannot parse {}: {e}", path.display()))
        })?;
        logging::data_operation(&format!("Loaded JSON data from {}", path.display()), Some("JSON"));
        Ok(value)
    }

    /// Write `value` as pretty JSON, creating parent directories
    pub fn save_json(&self, value: &Value, path: &Path) -> ShopResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(value)?)?;
        logging::data_operation(&format!("Saved JSON data to {}", path.display()), Some("JSON"));
        Ok(())
    }

    /// Contents of the users file
    pub fn user_data(&self) -> ShopResult<Value> {
        self.load_json(&self.files.users_file)
    }

    /// Contents of the products file
    pub fn product_data(&self) -> ShopResult<Value> {
        self.load_json(&self.files.products_file)
    }

    /// A named user record from the users file, e.g. `valid_user`
    pub fn stored_user(&self, key: &str) -> ShopResult<Option<TestUser>> {
        match self.user_data()?.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// The `valid_user` record, falling back to the template's credentials
    /// when the users file has none
    pub fn valid_user(&self) -> ShopResult<TestUser> {
        Ok(self.stored_user("valid_user")?.unwrap_or_else(|| TestUser {
            name: "Test User".to_string(),
            email: VALID_USER_EMAIL.to_string(),
            ..TestUser::default()
        }))
    }

    // ------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------

    /// A fresh user with a unique email; appended to `generated_users`
    /// in the users file when `save` is set
    pub fn generate_test_user(&self, save: bool) -> ShopResult<TestUser> {
        let mut rng = rand::thread_rng();
        let first_name = pick(&mut rng, FIRST_NAMES);
        let last_name = pick(&mut rng, LAST_NAMES);
        let user = TestUser {
            name: format!("{first_name} {last_name}"),
            email: unique_email(&first_name, "example.com"),
            password: format!(
                "{}{}!",
                generate_random_string(9),
                rng.gen_range(10..100)
            ),
            title: if rng.gen_bool(0.5) { "Mr" } else { "Mrs" }.to_string(),
            birth_day: rng.gen_range(1..=28).to_string(),
            birth_month: pick(&mut rng, MONTHS),
            birth_year: rng.gen_range(1960..=2003).to_string(),
            company: pick(&mut rng, COMPANIES),
            address: format!("{} {}", rng.gen_range(1..=999), pick(&mut rng, STREETS)),
            address2: format!("Apt {}{}", rng.gen_range(1..=40), pick(&mut rng, &["A", "B", "C"])),
            country: "India".to_string(),
            state: pick(&mut rng, STATES),
            city: pick(&mut rng, CITIES),
            zipcode: rng.gen_range(110_001..=855_999).to_string(),
            mobile_number: format!("9{:09}", rng.gen_range(0..1_000_000_000u64)),
            first_name,
            last_name,
        };

        if save {
            let path = &self.files.users_file;
            let mut existing = self.load_json(path)?;
            let Value::Object(map) = &mut existing else {
                return Err(ShopError::data(format!(
                    "{} must hold a JSON object",
                    path.display()
                )));
            };
            let generated = map
                .entry("generated_users")
                .or_insert_with(|| Value::Array(Vec::new()));
            match generated {
                Value::Array(users) => users.push(serde_json::to_value(&user)?),
                _ => {
                    return Err(ShopError::data("generated_users must be a JSON array"));
                }
            }
            self.save_json(&existing, path)?;
        }

        logging::data_operation("Generated test user data", Some("User"));
        Ok(user)
    }

    /// A fresh contact-us message
    #[must_use]
    pub fn generate_contact_data(&self) -> ContactMessage {
        let mut rng = rand::thread_rng();
        let first = pick(&mut rng, FIRST_NAMES);
        let last = pick(&mut rng, LAST_NAMES);
        let words: Vec<&str> = (0..rng.gen_range(20..60))
            .filter_map(|_| MESSAGE_WORDS.choose(&mut rng).copied())
            .collect();
        let message = ContactMessage {
            name: format!("{first} {last}"),
            email: unique_email(&first, "example.com"),
            subject: pick(&mut rng, SUBJECTS),
            message: format!("{}.", capitalize(&words.join(" "))),
        };
        logging::data_operation("Generated contact form data", Some("Contact"));
        message
    }

    /// One of the catalogue's product names
    #[must_use]
    pub fn random_product_name(&self) -> String {
        pick(&mut rand::thread_rng(), PRODUCT_NAMES)
    }

    /// One of the search terms known to return products
    #[must_use]
    pub fn random_search_term(&self) -> String {
        pick(&mut rand::thread_rng(), SEARCH_TERMS)
    }

    // ------------------------------------------------------------------
    // Scenario rows and templates
    // ------------------------------------------------------------------

    /// Rows of a named scenario sheet, e.g. `login_tests`
    pub fn scenario_data(&self, scenario: &str) -> ShopResult<Vec<Map<String, Value>>> {
        let sheets = self.load_json(&self.files.scenarios_file)?;
        let rows: Vec<Map<String, Value>> = sheets
            .get(scenario)
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| row.as_object().cloned())
                    .collect()
            })
            .unwrap_or_default();
        if rows.is_empty() {
            tracing::warn!(target: "shopcheck::data", scenario, "no test data for scenario");
        } else {
            logging::data_operation(&format!("Loaded test data for scenario: {scenario}"), Some("JSON"));
        }
        Ok(rows)
    }

    /// Write `valid_user` and `invalid_user` to the users file
    pub fn create_user_data_template(&self) -> ShopResult<()> {
        let template = json!({
            "valid_user": {
                "first_name": "Test",
                "last_name": "User",
                "email": VALID_USER_EMAIL,
                "password": DEFAULT_PASSWORD,
                "company": "Test Company",
                "address": "123 Test Street",
                "address2": "Apt 4B",
                "country": "India",
                "state": "Delhi",
                "city": "New Delhi",
                "zipcode": "110001",
                "mobile_number": "9876543210"
            },
            "invalid_user": {
                "first_name": "",
                "last_name": "",
                "email": "invalid-email",
                "password": "123",
                "company": "",
                "address": "",
                "address2": "",
                "country": "",
                "state": "",
                "city": "",
                "zipcode": "",
                "mobile_number": "invalid"
            }
        });
        self.save_json(&template, &self.files.users_file)
    }

    /// Write the catalogue sample to the products file
    pub fn create_product_data_template(&self) -> ShopResult<()> {
        let template = json!({
            "products": [
                { "id": 1, "name": "Blue Top", "price": "Rs. 500", "category": "Women > Tops" },
                { "id": 2, "name": "Men Tshirt", "price": "Rs. 400", "category": "Men > Tshirts" }
            ]
        });
        self.save_json(&template, &self.files.products_file)
    }

    /// Write the `login_tests` and `contact_tests` sheets
    pub fn create_scenario_data_template(&self) -> ShopResult<()> {
        let template = json!({
            "login_tests": [
                { "email": VALID_USER_EMAIL, "password": DEFAULT_PASSWORD, "expected_result": "success" },
                { "email": "invalid@email.com", "password": "wrongpass", "expected_result": "failure" },
                { "email": "", "password": "", "expected_result": "failure" }
            ],
            "contact_tests": [
                { "name": "Test User", "email": "test@example.com", "subject": "Test Subject", "message": "Test Message" },
                { "name": "", "email": "invalid-email", "subject": "", "message": "" }
            ]
        });
        self.save_json(&template, &self.files.scenarios_file)
    }

    /// Write every template
    pub fn create_test_data_templates(&self) -> ShopResult<()> {
        self.create_user_data_template()?;
        self.create_product_data_template()?;
        self.create_scenario_data_template()?;
        logging::data_operation("Created test data templates", Some("Templates"));
        Ok(())
    }
}

/// Random alphanumeric string of `len` characters
#[must_use]
pub fn generate_random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random address at `domain`, unique by construction
#[must_use]
pub fn generate_random_email(domain: &str) -> String {
    unique_email(&generate_random_string(6), domain)
}

fn unique_email(stem: &str, domain: &str) -> String {
    let stem: String = stem
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();
    let id = Uuid::new_v4().simple().to_string();
    format!("{stem}.{}@{domain}", &id[..12])
}

fn pick(rng: &mut impl Rng, items: &[&str]) -> String {
    items.choose(rng).copied().unwrap_or_default().to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn manager() -> (tempfile::TempDir, DataManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = DataManager::in_dir(dir.path());
        (dir, manager)
    }

    mod generation_tests {
        use super::*;

        #[test]
        fn test_generated_user_is_complete() {
            let (_dir, data) = manager();
            let user = data.generate_test_user(false).unwrap();
            assert!(!user.first_name.is_empty());
            assert_eq!(user.name, format!("{} {}", user.first_name, user.last_name));
            assert!(user.email.ends_with("@example.com"));
            assert_eq!(user.country, "India");
            assert!(MONTHS.contains(&user.birth_month.as_str()));
            let day: u32 = user.birth_day.parse().unwrap();
            assert!((1..=28).contains(&day));
            assert_eq!(user.mobile_number.len(), 10);
        }

        #[test]
        fn test_generated_emails_never_collide() {
            let (_dir, data) = manager();
            let emails: HashSet<String> = (0..2000)
                .map(|_| data.generate_test_user(false).unwrap().email)
                .collect();
            assert_eq!(emails.len(), 2000);
        }

        #[test]
        fn test_contact_message() {
            let (_dir, data) = manager();
            let msg = data.generate_contact_data();
            assert!(!msg.name.is_empty());
            assert!(msg.email.contains('@'));
            assert!(SUBJECTS.contains(&msg.subject.as_str()));
            assert!(msg.message.ends_with('.'));
        }

        #[test]
        fn test_random_helpers() {
            let (_dir, data) = manager();
            assert!(PRODUCT_NAMES.contains(&data.random_product_name().as_str()));
            assert!(SEARCH_TERMS.contains(&data.random_search_term().as_str()));
            let s = generate_random_string(16);
            assert_eq!(s.len(), 16);
            assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
            assert!(generate_random_email("shop.test").ends_with("@shop.test"));
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_saved_users_accumulate() {
            let (_dir, data) = manager();
            data.create_user_data_template().unwrap();
            let first = data.generate_test_user(true).unwrap();
            let second = data.generate_test_user(true).unwrap();
            let stored = data.user_data().unwrap();
            let generated = stored["generated_users"].as_array().unwrap();
            assert_eq!(generated.len(), 2);
            assert_eq!(generated[0]["email"], first.email);
            assert_eq!(generated[1]["email"], second.email);
            assert_eq!(stored["valid_user"]["email"], "testuser@example.com");
        }

        #[test]
        fn test_missing_file_reads_empty() {
            let (dir, data) = manager();
            let value = data.load_json(&dir.path().join("absent.json")).unwrap();
            assert_eq!(value, json!({}));
        }

        #[test]
        fn test_corrupt_file_is_error() {
            let (dir, data) = manager();
            let path = dir.path().join("broken.json");
            std::fs::write(&path, "{ not json").unwrap();
            assert!(matches!(data.load_json(&path), Err(ShopError::Data { .. })));
        }

        #[test]
        fn test_stored_valid_user() {
            let (_dir, data) = manager();
            data.create_user_data_template().unwrap();
            let user = data.stored_user("valid_user").unwrap().unwrap();
            assert_eq!(user.password, "Test123456");
            assert_eq!(user.display_name(), "Test User");
            assert!(data.stored_user("nobody").unwrap().is_none());
        }

        #[test]
        fn test_scenario_rows() {
            let (_dir, data) = manager();
            data.create_test_data_templates().unwrap();
            let rows = data.scenario_data("login_tests").unwrap();
            assert_eq!(rows.len(), 3);
            assert_eq!(rows[1]["expected_result"], "failure");
            assert!(data.scenario_data("checkout_tests").unwrap().is_empty());
            let products = data.product_data().unwrap();
            assert_eq!(products["products"][0]["name"], "Blue Top");
        }
    }
}
