//! # Line Shell
//!
//! A stand-in for the external router: reads one command per line and
//! answers with one JSON document per line.
//!
//! ```text
//! > add 1
//! {"ok":true,"data":{"lines":[...],"total":"$19.99",...}}
//! > submit
//! {"ok":true,"data":{"submissionId":"...","form":{...}}}
//! {"signal":{"type":"notify","level":"success","message":"Registration successful!"}}
//! {"signal":{"type":"navigate","route":"/store"}}
//! ```

use std::str::FromStr;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::{json, Value};
use storefront_core::ProductId;
use tracing::{info, warn};

use crate::commands::{cart, register};
use crate::config::StorefrontConfig;
use crate::error::ApiError;
use crate::state::{CartState, PendingSubmission, RegistrationState};

const HELP: &str = "\
products                 list the catalog
add <id>                 add one unit of a product to the cart
cart                     show the cart
set <field> <value>      change a registration field (value may contain spaces)
reset <field>            restore a field to its default
form                     show the registration form
submit                   submit the registration form
help                     show this help
quit                     exit";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Products,
    Add(ProductId),
    Cart,
    Set { field: String, value: String },
    Reset { field: String },
    Form,
    Submit,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = ApiError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_lowercase().as_str() {
            "products" => Command::Products,
            "add" => {
                let id = rest
                    .parse::<ProductId>()
                    .map_err(|_| ApiError::validation(format!("Invalid product id: {:?}", rest)))?;
                Command::Add(id)
            }
            "cart" => Command::Cart,
            "set" => {
                let (field, value) = match rest.split_once(char::is_whitespace) {
                    Some((field, value)) => (field, value.trim()),
                    None => (rest, ""),
                };
                if field.is_empty() {
                    return Err(ApiError::validation("Usage: set <field> <value>"));
                }
                Command::Set {
                    field: field.to_string(),
                    value: value.to_string(),
                }
            }
            "reset" if !rest.is_empty() => Command::Reset {
                field: rest.to_string(),
            },
            "reset" => return Err(ApiError::validation("Usage: reset <field>")),
            "form" => Command::Form,
            "submit" => Command::Submit,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(ApiError::validation(format!(
                    "Unknown command: {:?} (try \"help\")",
                    other
                )))
            }
        };

        Ok(command)
    }
}

/// What the shell loop does after a line.
#[derive(Debug)]
pub enum Flow {
    Reply(Value),
    Quit,
}

/// Application state as seen by the shell.
pub struct Shell {
    config: StorefrontConfig,
    cart: CartState,
    registration: RegistrationState,
    pending: Mutex<Vec<PendingSubmission>>,
}

impl Shell {
    pub fn new(config: StorefrontConfig, cart: CartState, registration: RegistrationState) -> Self {
        Shell {
            config,
            cart,
            registration,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Number of submissions started by this shell that have not settled yet.
    pub fn in_flight(&self) -> usize {
        let pending = self.pending.lock().expect("Pending mutex poisoned");
        pending.iter().filter(|p| !p.is_settled()).count()
    }

    /// Waits for every submission this shell started, so their signals are
    /// emitted before the caller tears the runtime down.
    pub async fn settle_pending(&self) {
        let pending = std::mem::take(&mut *self.pending.lock().expect("Pending mutex poisoned"));

        for submission in pending {
            let id = submission.id();
            match submission.wait().await {
                Ok(outcome) => info!(submission_id = %id, ?outcome, "Submission settled"),
                Err(e) => warn!(submission_id = %id, error = %e.message, "Submission task lost"),
            }
        }
    }

    /// Runs one line. Blank lines produce no reply.
    ///
    /// `submit` spawns a task, so this must run inside a tokio runtime.
    pub fn execute(&self, line: &str) -> Option<Flow> {
        if line.trim().is_empty() {
            return None;
        }

        let flow = match line.parse::<Command>() {
            Ok(Command::Quit) => Flow::Quit,
            Ok(command) => Flow::Reply(self.dispatch(command)),
            Err(e) => Flow::Reply(failure(e)),
        };
        Some(flow)
    }

    fn dispatch(&self, command: Command) -> Value {
        match command {
            Command::Products => success(cart::list_products(&self.cart, &self.config)),
            Command::Add(id) => reply(cart::add_to_cart(&self.cart, &self.config, id)),
            Command::Cart => success(cart::get_cart(&self.cart, &self.config)),
            Command::Set { field, value } => {
                reply(register::update_field(&self.registration, &field, value))
            }
            Command::Reset { field } => reply(register::reset_field(&self.registration, &field)),
            Command::Form => success(register::get_form(&self.registration)),
            // Signals reach the shell through the sink. The handle is kept so
            // shutdown can wait for the task.
            Command::Submit => reply(register::submit_registration(&self.registration).map(
                |(pending, response)| {
                    let mut list = self.pending.lock().expect("Pending mutex poisoned");
                    list.retain(|p| !p.is_settled());
                    list.push(pending);
                    response
                },
            )),
            Command::Help => json!({ "ok": true, "help": HELP }),
            Command::Quit => Value::Null,
        }
    }
}

fn reply<T: Serialize>(result: Result<T, ApiError>) -> Value {
    match result {
        Ok(data) => success(data),
        Err(e) => failure(e),
    }
}

fn success<T: Serialize>(data: T) -> Value {
    match serde_json::to_value(data) {
        Ok(data) => json!({ "ok": true, "data": data }),
        Err(e) => failure(ApiError::internal(e.to_string())),
    }
}

fn failure(error: ApiError) -> Value {
    json!({ "ok": false, "error": error })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::signals::NoOpSink;

    fn shell() -> Shell {
        let config = StorefrontConfig::default();
        let registration = RegistrationState::from_config(&config, Arc::new(NoOpSink));
        Shell::new(config, CartState::default(), registration)
    }

    fn reply_of(shell: &Shell, line: &str) -> Value {
        match shell.execute(line) {
            Some(Flow::Reply(value)) => value,
            other => panic!("expected a reply for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("products".parse::<Command>().unwrap(), Command::Products);
        assert_eq!("add 2".parse::<Command>().unwrap(), Command::Add(ProductId(2)));
        assert_eq!(
            "set fullName Jane Doe".parse::<Command>().unwrap(),
            Command::Set {
                field: "fullName".into(),
                value: "Jane Doe".into()
            }
        );
        assert_eq!(
            "set age".parse::<Command>().unwrap(),
            Command::Set {
                field: "age".into(),
                value: String::new()
            }
        );
        assert_eq!("QUIT".parse::<Command>().unwrap(), Command::Quit);
        assert!("add two".parse::<Command>().is_err());
        assert!("reset".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    #[test]
    fn test_cart_flow() {
        let shell = shell();
        reply_of(&shell, "add 1");
        let value = reply_of(&shell, "add 1");

        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["lineCount"], 1);
        assert_eq!(value["data"]["total"], "$39.98");
    }

    #[test]
    fn test_errors_are_replies() {
        let shell = shell();

        let value = reply_of(&shell, "add 7");
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["code"], "NOT_FOUND");

        let value = reply_of(&shell, "set nickname Jay");
        assert_eq!(value["error"]["code"], "NOT_FOUND");
    }

    #[test]
    fn test_blank_line_and_quit() {
        let shell = shell();
        assert!(shell.execute("   ").is_none());
        assert!(matches!(shell.execute("quit"), Some(Flow::Quit)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_through_shell() {
        let shell = shell();
        reply_of(&shell, "set fullName Jane Doe");
        reply_of(&shell, "set email jane@x.com");
        reply_of(&shell, "set password Secret1!");
        let value = reply_of(&shell, "set confirmPassword Secret1!");
        assert_eq!(value["data"]["canSubmit"], true);

        let value = reply_of(&shell, "submit");
        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["form"]["phase"]["phase"], "submitting");

        let value = reply_of(&shell, "submit");
        assert_eq!(value["error"]["code"], "BUSINESS_LOGIC");
        assert_eq!(shell.in_flight(), 1);

        shell.settle_pending().await;
        assert_eq!(shell.in_flight(), 0);
        assert_eq!(reply_of(&shell, "form")["data"]["phase"]["phase"], "succeeded");
    }
}
