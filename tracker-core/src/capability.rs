//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Optional platform capabilities. A missing capability is never an error.

/// Screen wake lock
pub trait WakeLock {
    fn request(&mut self) -> Result<(), String>;
    fn release(&mut self) -> Result<(), String>;
}

/// User choice on the install prompt
#[derive(Deserialize, PartialEq, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

/// Deferred platform install prompt. The user choice is reported asynchronously.
pub trait InstallPrompt {
    fn prompt(&mut self);
}

/// Manual install trigger holding the deferred prompt
#[derive(Default)]
pub struct InstallAffordance {
    deferred: Option<Box<dyn InstallPrompt + Send>>,
}

impl InstallAffordance {
    pub fn new() -> InstallAffordance {
        InstallAffordance::default()
    }
    /// Platform signals that the app can be installed
    pub fn on_prompt_available(&mut self, prompt: Box<dyn InstallPrompt + Send>) {
        debug!("Install prompt deferred");
        self.deferred = Some(prompt);
    }
    /// Whether the install button should be shown
    pub fn is_available(&self) -> bool {
        self.deferred.is_some()
    }
    /// Show the deferred prompt. A prompt can be used only once.
    pub fn trigger(&mut self) -> bool {
        match self.deferred.take() {
            Some(mut prompt) => {
                prompt.prompt();
                true
            }
            None => false,
        }
    }
    pub fn on_user_choice(&mut self, outcome: InstallOutcome) {
        info!("Install prompt outcome: {:?}", outcome);
    }
    /// App has been installed
    pub fn on_installed(&mut self) {
        self.deferred = None;
    }
}
