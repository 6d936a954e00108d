// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::backends::{NullMedia, ProcessRunner};
use crate::commands::{CommandDescriptor, CommandTable};
use crate::config::consts::DEFAULT_SHUTDOWN_TIMEOUT_MS;
use crate::config::{builtin_option_defs, EngineConfig, OptionStore, OptionValue, SetFlags};
use crate::engine::{Core, Engine, Services, WakeSignal, WorkerPool};
use crate::errors::ConfigError;
use crate::events::ClientHub;
use crate::observability::messages::engine::EngineStarted;
use crate::observability::messages::StructuredLog;
use crate::traits::{MediaBackend, SubprocessRunner};

/// Assembles an [`Engine`] from configuration plus the collaborators the
/// host provides. Anything not supplied falls back to the process runner
/// and a media backend that cannot open anything.
///
/// # Example
/// ```
/// use playcore::config::EngineConfig;
/// use playcore::engine::EngineBuilder;
///
/// let engine = EngineBuilder::from_config(EngineConfig::default()).build().unwrap();
/// assert!(engine.command_blocking("set volume 50").success);
/// engine.shutdown();
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    clients: Option<Arc<ClientHub>>,
    subprocess: Option<Arc<dyn SubprocessRunner>>,
    media: Option<Arc<dyn MediaBackend>>,
    commands: Vec<CommandDescriptor>,
    shutdown_timeout: Duration,
}

impl EngineBuilder {
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            clients: None,
            subprocess: None,
            media: None,
            commands: Vec::new(),
            shutdown_timeout: Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS),
        }
    }

    pub fn clients(mut self, hub: Arc<ClientHub>) -> Self {
        self.clients = Some(hub);
        self
    }

    pub fn subprocess(mut self, runner: Arc<dyn SubprocessRunner>) -> Self {
        self.subprocess = Some(runner);
        self
    }

    pub fn media(mut self, media: Arc<dyn MediaBackend>) -> Self {
        self.media = Some(media);
        self
    }

    /// Registers an extra command. Builtin names cannot be replaced.
    pub fn command(mut self, desc: CommandDescriptor) -> Self {
        self.commands.push(desc);
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Engine, ConfigError> {
        let config = self.config;
        let options = option_store(&config)?;

        let mut table = CommandTable::builtin();
        for desc in self.commands {
            table.register(desc);
        }

        let hub = self.clients.unwrap_or_default();
        let wake = Arc::new(WakeSignal::new());
        let services = Services {
            clients: hub.clone(),
            scheduler: wake.clone(),
            subprocess: self.subprocess.unwrap_or_else(|| Arc::new(ProcessRunner::new())),
            media: self.media.unwrap_or_else(|| Arc::new(NullMedia)),
        };

        let core = Arc::new(Mutex::new(Core::new(options, Arc::new(table), services)));
        let pool = WorkerPool::new(
            config.get_worker_threads(),
            config.get_queue_capacity(),
            Arc::downgrade(&core),
        )
        .map_err(|e| ConfigError::Runtime(e.to_string()))?;

        {
            let mut guard = core.lock();
            EngineStarted {
                properties: guard.properties.len(),
                commands: guard.commands.len(),
                worker_threads: pool.threads(),
            }
            .log();
            guard.pool = Some(pool);

            // Initial assignments behave like command-line options.
            for (name, text) in &config.set {
                guard
                    .on_set_option_string(name, text, SetFlags::FROM_CMDLINE)
                    .map_err(|source| ConfigError::Option {
                        name: name.clone(),
                        source,
                    })?;
            }
        }

        Ok(Engine::new(core, hub, wake, self.shutdown_timeout))
    }
}

fn option_store(config: &EngineConfig) -> Result<OptionStore, ConfigError> {
    let defs = builtin_option_defs().into_iter().chain(config.options.iter().cloned());
    let mut store = OptionStore::from_defs(defs)?;

    let osd_duration = i64::try_from(config.get_osd_duration_ms()).unwrap_or(i64::MAX);
    store
        .set("osd-duration", OptionValue::Int(osd_duration), SetFlags::NONE)
        .map_err(|source| ConfigError::Option {
            name: "osd-duration".into(),
            source,
        })?;

    for (name, profile) in &config.profiles {
        if let Some(option) = profile.options.keys().find(|o| store.resolve(o).is_none()) {
            return Err(ConfigError::UnknownProfileOption {
                profile: name.clone(),
                option: option.clone(),
            });
        }
        store.add_profile(name, profile.clone());
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_str, ConfigFormat, Profile};

    #[test]
    fn test_config_shapes_the_option_store() {
        let config = load_config_str(
            r#"
osd_duration_ms: 2500
options:
  - name: brightness
    type: int
    default: "10"
profiles:
  quiet:
    options:
      volume: "30"
"#,
            ConfigFormat::Yaml,
        )
        .unwrap();
        let store = option_store(&config).unwrap();
        assert_eq!(store.get("osd-duration"), Some(&OptionValue::Int(2500)));
        assert_eq!(store.get("brightness"), Some(&OptionValue::Int(10)));
        assert!(store.profile("quiet").is_some());
    }

    #[test]
    fn test_profile_with_unknown_option_is_rejected() {
        let mut config = EngineConfig::default();
        let mut profile = Profile::default();
        profile.options.insert("no-such-option".into(), "1".into());
        config.profiles.insert("broken".into(), profile);
        assert!(matches!(
            option_store(&config),
            Err(ConfigError::UnknownProfileOption { .. })
        ));
    }

    #[test]
    fn test_initial_set_is_from_cmdline() {
        let mut config = EngineConfig::default();
        config.set.insert("speed".into(), "1.5".into());
        let engine = EngineBuilder::from_config(config).build().unwrap();
        {
            let core = engine.lock();
            assert_eq!(core.options.get_f64("speed"), Some(1.5));
            assert!(core.options.resolve("speed").unwrap().set_from_cmdline);
        }

        let mut bad = EngineConfig::default();
        bad.set.insert("speed".into(), "fast".into());
        assert!(EngineBuilder::from_config(bad).build().is_err());
    }
}
