#[cfg(test)]
#[path = "command_test.rs"]
mod tests;

pub struct Command {
    command: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn parse(text: &str) -> Option<Command> {
        if !text.trim().starts_with('/') {
            return None;
        }

        let mut args = text
            .trim()
            .split(' ')
            .filter(|e| return !e.is_empty())
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        let prefix = args[0].to_string();
        args.remove(0);

        let cmd = Command {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_help()
            || cmd.is_cancel()
            || cmd.is_connect()
            || cmd.is_sessions()
            || cmd.is_history()
            || cmd.is_filters()
            || cmd.is_filter_submit()
            || cmd.is_entities()
            || cmd.is_select()
            || cmd.is_chart()
            || cmd.is_result()
        {
            return Some(cmd);
        }

        return None;
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }

    pub fn is_cancel(&self) -> bool {
        return self.command == "/cancel";
    }

    pub fn is_connect(&self) -> bool {
        return self.command == "/connect";
    }

    pub fn is_sessions(&self) -> bool {
        return ["/s", "/sessions"].contains(&self.command.as_str());
    }

    pub fn is_history(&self) -> bool {
        return self.command == "/history";
    }

    pub fn is_filters(&self) -> bool {
        return self.command == "/filters";
    }

    pub fn is_filter_submit(&self) -> bool {
        return ["/f", "/filter"].contains(&self.command.as_str());
    }

    pub fn is_entities(&self) -> bool {
        return self.command == "/entities";
    }

    pub fn is_select(&self) -> bool {
        return self.command == "/select";
    }

    pub fn is_chart(&self) -> bool {
        return self.command == "/chart";
    }

    pub fn is_result(&self) -> bool {
        return self.command == "/result";
    }
}
