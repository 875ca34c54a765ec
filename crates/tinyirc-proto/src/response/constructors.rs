//! Numeric reply constructors.
//!
//! Each constructor returns an unbound [`Numeric`]; the recipient's nick is
//! supplied later by [`Numeric::bind`].

use super::{Numeric, Response};

macro_rules! impl_numeric {
    (
        $(#[$meta:meta])*
        $name:ident, $resp:ident, $msg:literal
    ) => {
        $(#[$meta])*
        pub fn $name() -> Numeric {
            Numeric::new(Response::$resp, vec![$msg.to_string()])
        }
    };
    (
        $(#[$meta:meta])*
        $name:ident, $resp:ident, $arg:ident, $msg:literal
    ) => {
        $(#[$meta])*
        pub fn $name($arg: &str) -> Numeric {
            Numeric::new(
                Response::$resp,
                vec![$arg.to_string(), $msg.to_string()],
            )
        }
    };
}

impl Numeric {
    // === Registration ===

    /// `001 RPL_WELCOME`
    /// `:Welcome to the <network> Internet Relay Chat Network <nick>`
    pub fn rpl_welcome(network: &str, nick: &str) -> Numeric {
        Numeric::new(
            Response::RPL_WELCOME,
            vec![format!(
                "Welcome to the {} Internet Relay Chat Network {}",
                network, nick
            )],
        )
    }

    /// `251 RPL_LUSERCLIENT`
    /// `:There are <users> users and <invisible> invisible on <servers> servers`
    pub fn rpl_luserclient(users: usize, invisible: usize, servers: usize) -> Numeric {
        Numeric::new(
            Response::RPL_LUSERCLIENT,
            vec![format!(
                "There are {} users and {} invisible on {} servers",
                users, invisible, servers
            )],
        )
    }

    /// `255 RPL_LUSERME`
    /// `:I have <clients> clients and <servers> servers`
    pub fn rpl_luserme(clients: usize, servers: usize) -> Numeric {
        Numeric::new(
            Response::RPL_LUSERME,
            vec![format!("I have {} clients and {} servers", clients, servers)],
        )
    }

    /// `263 RPL_TRYAGAIN`
    /// `<command> :Command dropped. <reason>`
    pub fn rpl_tryagain(command: &str, reason: Option<&str>) -> Numeric {
        Numeric::new(
            Response::RPL_TRYAGAIN,
            vec![
                command.to_string(),
                format!(
                    "Command dropped. {}",
                    reason.unwrap_or("Please try again later.")
                ),
            ],
        )
    }

    // === Channels ===

    impl_numeric!(
        /// `331 RPL_NOTOPIC`
        rpl_notopic, RPL_NOTOPIC, channel, "No topic is set"
    );

    /// `332 RPL_TOPIC`
    /// `<channel> :<topic>`
    pub fn rpl_topic(channel: &str, topic: &str) -> Numeric {
        Numeric::new(
            Response::RPL_TOPIC,
            vec![channel.to_string(), topic.to_string()],
        )
    }

    /// `353 RPL_NAMREPLY`
    /// `= <channel> :<nick> *( " " <nick> )`
    pub fn rpl_namreply(channel: &str, names: &[String]) -> Numeric {
        Numeric::new(
            Response::RPL_NAMREPLY,
            vec!["=".to_string(), channel.to_string(), names.join(" ")],
        )
    }

    impl_numeric!(
        /// `366 RPL_ENDOFNAMES`
        rpl_endofnames, RPL_ENDOFNAMES, channel, "End of /NAMES list."
    );

    // === MOTD ===

    /// `375 RPL_MOTDSTART`
    /// `:- <server> Message of the day - `
    pub fn rpl_motdstart(server: &str) -> Numeric {
        Numeric::new(
            Response::RPL_MOTDSTART,
            vec![format!("- {} Message of the day - ", server)],
        )
    }

    /// `372 RPL_MOTD`
    /// `:- <text>`
    pub fn rpl_motd(text: &str) -> Numeric {
        Numeric::new(Response::RPL_MOTD, vec![format!("- {}", text)])
    }

    impl_numeric!(
        /// `376 RPL_ENDOFMOTD`
        rpl_endofmotd, RPL_ENDOFMOTD, "End of /MOTD command"
    );

    // === Errors ===

    impl_numeric!(
        /// `402 ERR_NOSUCHSERVER`
        err_nosuchserver, ERR_NOSUCHSERVER, server, "No such server"
    );

    impl_numeric!(
        /// `403 ERR_NOSUCHCHANNEL`
        err_nosuchchannel, ERR_NOSUCHCHANNEL, channel, "No such channel"
    );

    impl_numeric!(
        /// `405 ERR_TOOMANYCHANNELS`
        err_toomanychannels, ERR_TOOMANYCHANNELS, channel, "You have joined too many channels"
    );

    impl_numeric!(
        /// `421 ERR_UNKNOWNCOMMAND`
        err_unknowncommand, ERR_UNKNOWNCOMMAND, command, "Unknown command"
    );

    impl_numeric!(
        /// `431 ERR_NONICKNAMEGIVEN`
        err_nonicknamegiven, ERR_NONICKNAMEGIVEN, "No nickname given"
    );

    impl_numeric!(
        /// `432 ERR_ERRONEOUSNICKNAME`
        err_erroneousnickname, ERR_ERRONEOUSNICKNAME, nick, "Erroneous nickname"
    );

    impl_numeric!(
        /// `433 ERR_NICKNAMEINUSE`
        err_nicknameinuse, ERR_NICKNAMEINUSE, nick, "Nickname is already in use"
    );

    impl_numeric!(
        /// `436 ERR_NICKCOLLISION`
        err_nickcollision, ERR_NICKCOLLISION, nick, "Nickname collision KILL"
    );

    impl_numeric!(
        /// `442 ERR_NOTONCHANNEL`
        err_notonchannel, ERR_NOTONCHANNEL, channel, "You're not on that channel"
    );

    impl_numeric!(
        /// `451 ERR_NOTREGISTERED`
        err_notregistered, ERR_NOTREGISTERED, "You have not registered"
    );

    impl_numeric!(
        /// `461 ERR_NEEDMOREPARAMS`
        err_needmoreparams, ERR_NEEDMOREPARAMS, command, "Not enough parameters"
    );

    impl_numeric!(
        /// `462 ERR_ALREADYREGISTERED`
        err_alreadyregistered, ERR_ALREADYREGISTERED, "You may not reregister"
    );

    impl_numeric!(
        /// `471 ERR_CHANNELISFULL`
        err_channelisfull, ERR_CHANNELISFULL, channel, "Cannot join channel (+l)"
    );

    impl_numeric!(
        /// `473 ERR_INVITEONLYCHAN`
        err_inviteonlychan, ERR_INVITEONLYCHAN, channel, "Cannot join channel (+i)"
    );

    impl_numeric!(
        /// `474 ERR_BANNEDFROMCHAN`
        err_bannedfromchan, ERR_BANNEDFROMCHAN, channel, "Cannot join channel (+b)"
    );

    impl_numeric!(
        /// `475 ERR_BADCHANNELKEY`
        err_badchannelkey, ERR_BADCHANNELKEY, channel, "Cannot join channel (+k)"
    );
}
