use anyhow::Result;

use zephyr_lib::identity::application_uid;

use crate::output::{OutputFormat, print_json};

pub fn cmd_uid(org: &str, project: &str, name: &str, format: OutputFormat) -> Result<()> {
  let uid = application_uid(org, project, name);
  if format.is_json() {
    print_json(&serde_json::json!({ "application_uid": uid }))?;
  } else {
    println!("{}", uid);
  }
  Ok(())
}
