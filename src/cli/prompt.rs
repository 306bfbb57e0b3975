// Terminal prompts for the login flow
use crate::error::Result;
use crate::login::Interaction;
use crate::models::Device;
use dialoguer::{Input, Password, Select};

#[allow(clippy::ptr_arg)]
fn non_empty(input: &String) -> std::result::Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("Value cannot be empty")
    } else {
        Ok(())
    }
}

/// Interaction backed by dialoguer prompts on the controlling terminal
pub struct TerminalInteraction;

impl Interaction for TerminalInteraction {
    fn choose_device_index(&self, devices: &[Device]) -> Result<usize> {
        let items: Vec<String> = devices
            .iter()
            .map(|device| device.device_type.clone())
            .collect();

        let index = Select::new()
            .with_prompt("Choose an MFA device")
            .items(&items)
            .default(0)
            .interact()?;
        Ok(index)
    }

    fn input_mfa_token(&self) -> Result<String> {
        let token = Input::<String>::new()
            .with_prompt("MFA token")
            .validate_with(non_empty)
            .interact_text()?;
        Ok(token.trim().to_string())
    }

    fn push_pending(&self, device: &Device) {
        eprintln!("Waiting for approval on {}...", device.device_type);
    }
}

pub fn read_username() -> Result<String> {
    let username: String = Input::<String>::new()
        .with_prompt("Username or email")
        .validate_with(non_empty)
        .interact_text()?;
    Ok(username.trim().to_string())
}

pub fn read_password() -> Result<String> {
    Ok(Password::new().with_prompt("Password").interact()?)
}
