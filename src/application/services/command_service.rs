use crate::domain::entities::{Activity, Command, CommandRegistry, CommandReply};
use crate::application::errors::CommandError;

/// Service for managing and executing console slash commands
pub struct CommandService {
    registry: CommandRegistry,
    prefix: String,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            prefix: prefix.into(),
        }
    }

    pub fn register(&mut self, command: Command) {
        self.registry.register(command);
    }

    pub fn register_defaults(&mut self) {
        self.register(Command::new("version")
            .with_description("Show bot version")
            .with_handler(|_, _| {
                Ok(CommandReply::Text(format!("cake-bot v{}", env!("CARGO_PKG_VERSION"))))
            }));

        self.register(Command::new("reset")
            .with_description("Forget the cake chosen so far")
            .with_aliases(vec!["restart".to_string()])
            .with_usage("/reset (or /restart)")
            .with_handler(|_, _| Ok(CommandReply::ResetConversation)));

        self.register(Command::new("profile")
            .with_description("Show what the bot knows about you")
            .with_handler(|_, _| Ok(CommandReply::ShowProfile)));

        self.register(Command::new("quit")
            .with_description("Leave the console")
            .with_aliases(vec!["exit".to_string()])
            .with_handler(|_, _| Ok(CommandReply::Quit)));
    }

    pub fn handle(&self, name: &str, args: &[String], activity: &Activity) -> Result<CommandReply, CommandError> {
        if name == "help" {
            return Ok(CommandReply::Text(self.get_help(args.first().map(String::as_str))));
        }

        let cmd = self.registry.find(name)
            .ok_or_else(|| CommandError::NotFound(name.to_string()))?;

        match &cmd.handler {
            Some(handler) => handler(activity, args),
            None => Err(CommandError::ExecutionFailed(format!("Command {} not implemented", cmd.name))),
        }
    }

    pub fn get_help(&self, command: Option<&str>) -> String {
        if let Some(name) = command {
            if let Some(cmd) = self.registry.find(name) {
                let mut help = format!("{}{} - {}", self.prefix, cmd.name, cmd.description.as_deref().unwrap_or("No description"));
                if let Some(usage) = &cmd.usage {
                    help.push_str(&format!("\nUsage: {}", usage));
                }
                return help;
            }
            return format!("Command {}{} not found", self.prefix, name);
        }

        let mut help = format!("Available commands:\n  {}help - Show this message\n", self.prefix);
        for cmd in self.registry.all() {
            help.push_str(&format!("  {}{} - {}\n", self.prefix, cmd.name, cmd.description.as_deref().unwrap_or("")));
        }
        help.push_str("Anything else is sent to the bot.");
        help
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
