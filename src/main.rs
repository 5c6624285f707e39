//! cmdtree demo shell - an interactive router-style CLI.
//!
//! Builds a small sample grammar (show/enable/hostname/interface/ping and
//! friends) and drives the read-evaluate loop against stdin. Commands
//! stamp a command code and their arguments into the session's slot
//! store; this binary dispatches on the code after each completed line.

use std::error::Error;
use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use tracing::info;

use cmdtree::control::PRIVILEGE_MAX;
use cmdtree::engine::Outcome;
use cmdtree::grammar::{AddressFormats, NodeType, TreeId};
use cmdtree::session::Session;
use cmdtree::shell::{Cycle, Shell, StdinSource};
use cmdtree::tracing_config;

/// Integer slot holding the code of the last completed command.
const SLOT_CMD: usize = 0;
/// Integer slot holding a numeric argument (interface number, level).
const SLOT_ARG: usize = 1;
/// Integer slot holding the privilege level requested by `enable`.
const SLOT_PRIV: usize = 2;
/// String slot holding a captured hostname.
const SLOT_NAME: usize = 0;
/// String slot holding the selected interface type.
const SLOT_IFTYPE: usize = 1;
/// Address slot holding a ping target.
const SLOT_ADDR: usize = 0;

const CMD_SHOW_VERSION: i64 = 1;
const CMD_SHOW_CLOCK: i64 = 2;
const CMD_SHOW_PRIVILEGE: i64 = 3;
const CMD_ENABLE: i64 = 4;
const CMD_DISABLE: i64 = 5;
const CMD_HOSTNAME: i64 = 6;
const CMD_INTERFACE: i64 = 7;
const CMD_PING: i64 = 8;
const CMD_DEBUG: i64 = 9;
const CMD_EXIT: i64 = 10;

#[derive(Parser)]
#[command(name = "cmdtree")]
#[command(about = "Interactive demo shell for the cmdtree grammar engine")]
struct Cli {
    /// Initial privilege level (0-15)
    #[arg(short, long, default_value_t = 1)]
    privilege: u8,

    /// Shell hostname, used as the prompt
    #[arg(long, default_value = "Router")]
    hostname: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_config::init_shell_mode()?;
    let cli = Cli::parse();

    let mut session = Session::new()?;
    session.set_privilege(cli.privilege.min(PRIVILEGE_MAX));
    let tree = build_grammar(&mut session)?;
    info!("sample grammar ready");

    let mut hostname = cli.hostname;
    let mut shell = Shell::new(StdinSource, io::stdout(), io::stderr())
        .with_prompt(&format!("{hostname}> "));

    loop {
        match shell.process_line(&mut session, tree)? {
            Cycle::Eof => break,
            Cycle::Evaluated(Outcome::Complete) => {
                let code = session.control().get_integer(SLOT_CMD)?;
                if !dispatch(code, &mut session, &mut hostname)? {
                    break;
                }
                shell.set_prompt(&format!("{hostname}> "));
            }
            _ => {}
        }
    }

    Ok(())
}

/// Builds the sample grammar. Returns the exec tree identity.
fn build_grammar(session: &mut Session) -> Result<TreeId, Box<dyn Error>> {
    let tree = session.create_tree("exec", None)?;
    let root = session.tree_root(tree)?;

    // show { version | clock | privilege }
    let show = session.create_node(NodeType::Keyword);
    session.set_keyword(show, "show")?;
    session.set_minimum_match(show, 2)?;
    session.set_help_text(show, "Show running system information")?;
    session.attach_child(root, show)?;

    let version = session.create_node(NodeType::Keyword);
    session.set_keyword(version, "version")?;
    session.set_minimum_match(version, 3)?;
    session.set_help_text(version, "System hardware and software status")?;
    session.set_keyword_effect_integer(version, SLOT_CMD, CMD_SHOW_VERSION)?;
    session.attach_child(show, version)?;

    let clock = session.create_node(NodeType::Keyword);
    session.set_keyword(clock, "clock")?;
    session.set_help_text(clock, "Display the system clock")?;
    session.set_keyword_effect_integer(clock, SLOT_CMD, CMD_SHOW_CLOCK)?;
    session.attach_child(show, clock)?;

    let privilege = session.create_node(NodeType::Keyword);
    session.set_keyword(privilege, "privilege")?;
    session.set_help_text(privilege, "Show current privilege level")?;
    session.set_keyword_effect_integer(privilege, SLOT_CMD, CMD_SHOW_PRIVILEGE)?;
    session.attach_child(show, privilege)?;

    // enable [<0-15>], defaulting to level 15 via a constant node
    let enable = session.create_node(NodeType::Keyword);
    session.set_keyword(enable, "enable")?;
    session.set_minimum_match(enable, 2)?;
    session.set_help_text(enable, "Turn on privileged commands")?;
    session.set_keyword_effect_integer(enable, SLOT_CMD, CMD_ENABLE)?;
    session.attach_child(root, enable)?;

    let level = session.create_node(NodeType::Integer);
    session.set_integer_range(level, 0, i64::from(PRIVILEGE_MAX))?;
    session.set_integer_index(level, SLOT_PRIV)?;
    session.set_help_text(level, "Privilege level to enter")?;
    session.attach_child(enable, level)?;

    let default_level = session.create_node(NodeType::Constant);
    session.set_constant_effect_integer(default_level, SLOT_PRIV, i64::from(PRIVILEGE_MAX))?;
    session.attach_child(enable, default_level)?;

    let disable = session.create_node(NodeType::Keyword);
    session.set_keyword(disable, "disable")?;
    session.set_help_text(disable, "Turn off privileged commands")?;
    session.set_keyword_effect_integer(disable, SLOT_CMD, CMD_DISABLE)?;
    session.attach_child(root, disable)?;

    // hostname WORD
    let hostname = session.create_node(NodeType::Keyword);
    session.set_keyword(hostname, "hostname")?;
    session.set_help_text(hostname, "Set system's network name")?;
    session.set_keyword_effect_integer(hostname, SLOT_CMD, CMD_HOSTNAME)?;
    session.attach_child(root, hostname)?;

    let name = session.create_node(NodeType::FreeString);
    session.set_string_index(name, SLOT_NAME)?;
    session.set_help_text(name, "This system's network name")?;
    session.attach_child(hostname, name)?;

    // interface {ethernet|loopback|serial} <0-48>
    let interface = session.create_node(NodeType::Keyword);
    session.set_keyword(interface, "interface")?;
    session.set_minimum_match(interface, 3)?;
    session.set_help_text(interface, "Select an interface to configure")?;
    session.set_keyword_effect_integer(interface, SLOT_CMD, CMD_INTERFACE)?;
    session.attach_child(root, interface)?;

    let iftype = session.create_node(NodeType::Selector);
    session.set_selector_keywords(iftype, &["ethernet", "loopback", "serial"])?;
    session.set_selector_index(iftype, SLOT_IFTYPE)?;
    session.set_help_text(iftype, "Interface type")?;
    session.attach_child(interface, iftype)?;

    let ifnum = session.create_node(NodeType::Integer);
    session.set_integer_range(ifnum, 0, 48)?;
    session.set_integer_index(ifnum, SLOT_ARG)?;
    session.set_help_text(ifnum, "Interface number")?;
    session.attach_child(iftype, ifnum)?;

    // ping <A.B.C.D|X:X::X>
    let ping = session.create_node(NodeType::Keyword);
    session.set_keyword(ping, "ping")?;
    session.set_help_text(ping, "Send echo messages")?;
    session.set_keyword_effect_integer(ping, SLOT_CMD, CMD_PING)?;
    session.attach_child(root, ping)?;

    let target = session.create_node(NodeType::Address);
    session.set_address_formats(target, AddressFormats::IPV4 | AddressFormats::IPV6)?;
    session.set_address_index(target, SLOT_ADDR)?;
    session.set_help_text(target, "Destination address")?;
    session.attach_child(ping, target)?;

    // debug: hidden, privileged
    let debug = session.create_node(NodeType::Keyword);
    session.set_keyword(debug, "debug")?;
    session.set_keyword_effect_integer(debug, SLOT_CMD, CMD_DEBUG)?;
    session.set_hidden(debug, true)?;
    session.set_node_privilege(debug, 15)?;
    session.attach_child(root, debug)?;

    let exit = session.create_node(NodeType::Keyword);
    session.set_keyword(exit, "exit")?;
    session.set_help_text(exit, "Exit the shell")?;
    session.set_keyword_effect_integer(exit, SLOT_CMD, CMD_EXIT)?;
    session.attach_child(root, exit)?;

    Ok(tree)
}

/// Acts on a completed command. Returns `false` when the shell should
/// exit.
fn dispatch(
    code: i64,
    session: &mut Session,
    hostname: &mut String,
) -> Result<bool, Box<dyn Error>> {
    let mut stdout = io::stdout();
    match code {
        CMD_SHOW_VERSION => {
            writeln!(
                stdout,
                "cmdtree demo shell, version {}",
                env!("CARGO_PKG_VERSION")
            )?;
        }
        CMD_SHOW_CLOCK => {
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?;
            writeln!(stdout, "*{}s since epoch (clock unsynchronized)", now.as_secs())?;
        }
        CMD_SHOW_PRIVILEGE => {
            writeln!(
                stdout,
                "Current privilege level is {}",
                session.control().privilege()
            )?;
        }
        CMD_ENABLE => {
            let level = session.control().get_integer(SLOT_PRIV)?;
            session.set_privilege(u8::try_from(level).unwrap_or(PRIVILEGE_MAX));
        }
        CMD_DISABLE => {
            session.set_privilege(1);
        }
        CMD_HOSTNAME => {
            *hostname = session.control().get_string(SLOT_NAME)?.to_string();
        }
        CMD_INTERFACE => {
            let iftype = session.control().get_string(SLOT_IFTYPE)?;
            let number = session.control().get_integer(SLOT_ARG)?;
            writeln!(stdout, "Selected interface {iftype}{number}")?;
        }
        CMD_PING => {
            if let Some(address) = session.control().get_address(SLOT_ADDR)? {
                writeln!(stdout, "Sending 5 echo messages to {address}")?;
            }
        }
        CMD_DEBUG => {
            writeln!(stdout, "Debugging is on")?;
        }
        CMD_EXIT => return Ok(false),
        _ => {}
    }
    Ok(true)
}
