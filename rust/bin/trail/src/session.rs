//! Interactive session: the presentation layer over router and tracker.
//!
//! One line in, zero or more lines out. Route changes and discovery events
//! are captured by subscriptions and printed after the command that caused
//! them.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::bail;
use trail_core::ContentIndex;
use trail_discovery::{DiscoveryTracker, ElementRef};
use trail_flux::Unsubscribe;
use trail_nav::{MemoryHost, NavigateOptions, NavigationHost, RouteState, Router, RouterConfig};

pub const HELP: &str = "\
commands:
  go <id>        move to a topic at the same depth
  drill <id>     open a topic one level deeper
  replace <id>   like go, without a new history entry
  up             one breadcrumb level toward the root
  back           previous history entry
  forward        next history entry
  where          show the breadcrumb
  see <id>       discover a topic through a link on this page
  seed <id>      discover a topic without telling anyone
  progress       list discovered topics
  reset          forget all discoveries
  links          outbound links of this topic
  topics         all published topics
  help           this text
  quit           leave";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Drill(String),
    Replace(String),
    Up,
    Back,
    Forward,
    Where,
    See(String),
    Seed(String),
    Progress,
    Reset,
    Links,
    Topics,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let arg = words.next().map(str::to_string);
        if let Some(extra) = words.next() {
            bail!("unexpected argument: {}", extra);
        }

        let with_id = |make: fn(String) -> Command| -> anyhow::Result<Command> {
            match arg.clone() {
                Some(id) => Ok(make(id)),
                None => bail!("usage: {} <id>", name),
            }
        };
        let bare = |cmd: Command| -> anyhow::Result<Command> {
            match &arg {
                Some(a) => bail!("{} takes no argument, got {}", name, a),
                None => Ok(cmd),
            }
        };

        let cmd = match name {
            "go" => with_id(Command::Go)?,
            "drill" => with_id(Command::Drill)?,
            "replace" => with_id(Command::Replace)?,
            "see" => with_id(Command::See)?,
            "seed" => with_id(Command::Seed)?,
            "up" => bare(Command::Up)?,
            "back" => bare(Command::Back)?,
            "forward" => bare(Command::Forward)?,
            "where" => bare(Command::Where)?,
            "progress" => bare(Command::Progress)?,
            "reset" => bare(Command::Reset)?,
            "links" => bare(Command::Links)?,
            "topics" => bare(Command::Topics)?,
            "help" | "?" => bare(Command::Help)?,
            "quit" | "exit" => bare(Command::Quit)?,
            other => bail!("unknown command: {} (try `help`)", other),
        };
        Ok(Some(cmd))
    }
}

/// Whether the session keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The link a discovery came through. Handed to observers as the source
/// element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub from: String,
}

type EventLog = Arc<Mutex<Vec<String>>>;

pub struct Session {
    host: Arc<MemoryHost>,
    router: Arc<Router>,
    tracker: DiscoveryTracker,
    content: Option<ContentIndex>,
    events: EventLog,
    subscriptions: Vec<Unsubscribe>,
}

impl Session {
    /// Start a session at `start_url`.
    pub fn new(start_url: &str, config: RouterConfig, content: Option<ContentIndex>) -> Self {
        let host = Arc::new(MemoryHost::new(start_url));
        let router = Router::new(host.clone(), config);
        let tracker = DiscoveryTracker::new();
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));

        let log = events.clone();
        let on_route = router.subscribe(move |route: &RouteState| {
            push_event(&log, format!("-> {} ({})", route, route.url()));
        });
        let log = events.clone();
        let on_discovery = tracker.on_discovery(move |node_id, source| {
            let line = match source.downcast_ref::<Link>() {
                Some(link) => format!("* discovered {} via link on {}", node_id, link.from),
                None => format!("* discovered {}", node_id),
            };
            push_event(&log, line);
        });

        Self {
            host,
            router,
            tracker,
            content,
            events,
            subscriptions: vec![on_route, on_discovery],
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn tracker(&self) -> &DiscoveryTracker {
        &self.tracker
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    /// Parse and run one input line, writing everything it produced.
    pub fn handle_line(&self, line: &str, out: &mut impl Write) -> anyhow::Result<Flow> {
        let flow = match Command::parse(line) {
            Ok(Some(cmd)) => self.execute(cmd, out)?,
            Ok(None) => Flow::Continue,
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                Flow::Continue
            }
        };
        self.flush_events(out)?;
        Ok(flow)
    }

    /// Run a command. Events it triggers stay queued until
    /// [`flush_events`](Self::flush_events).
    pub fn execute(&self, cmd: Command, out: &mut impl Write) -> anyhow::Result<Flow> {
        match cmd {
            Command::Go(id) => self.navigate(out, id, NavigateOptions::new())?,
            Command::Drill(id) => self.navigate(out, id, NavigateOptions::drill())?,
            Command::Replace(id) => {
                self.navigate(out, id, NavigateOptions::new().replace(true))?
            }
            Command::Up => {
                if !self.router.navigate_up() {
                    writeln!(out, "already at the root")?;
                }
            }
            Command::Back => {
                if !self.host.back() {
                    writeln!(out, "no earlier entry")?;
                }
            }
            Command::Forward => {
                if !self.host.forward() {
                    writeln!(out, "no later entry")?;
                }
            }
            Command::Where => self.print_where(out)?,
            Command::See(id) => {
                let link = ElementRef::new(Link {
                    from: self.router.node_id(),
                });
                if !self.tracker.mark_topic_discovered(&id, Some(&link)) {
                    writeln!(out, "{} already discovered", id)?;
                }
            }
            Command::Seed(id) => {
                if self.tracker.mark_topic_discovered(&id, None) {
                    writeln!(out, "seeded {}", id)?;
                } else {
                    writeln!(out, "{} already discovered", id)?;
                }
            }
            Command::Progress => self.print_progress(out)?,
            Command::Reset => {
                self.tracker.reset_all_progress();
                writeln!(out, "progress cleared")?;
            }
            Command::Links => self.print_links(out)?,
            Command::Topics => self.print_topics(out)?,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Write and clear queued route/discovery events.
    pub fn flush_events(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let events = {
            let mut log = self.events.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *log)
        };
        for line in events {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    fn navigate(
        &self,
        out: &mut impl Write,
        id: String,
        options: NavigateOptions,
    ) -> anyhow::Result<()> {
        if let Some(content) = &self.content {
            if !content.contains(&id) {
                writeln!(out, "note: {} is not in the listing", id)?;
            }
        }
        self.router.navigate_to(id, options);
        Ok(())
    }

    fn title<'a>(&'a self, id: &'a str) -> &'a str {
        self.content
            .as_ref()
            .and_then(|c| c.title(id))
            .unwrap_or(id)
    }

    fn print_where(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let route = self.router.current();
        let crumbs: Vec<&str> = route.path().iter().map(|id| self.title(id)).collect();
        writeln!(out, "{}", crumbs.join(" › "))?;
        writeln!(
            out,
            "url {}  depth {}  history {}/{}",
            self.host.location(),
            route.depth(),
            self.host.index() + 1,
            self.host.len()
        )?;
        Ok(())
    }

    fn print_progress(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let found = self.tracker.discovered();
        match &self.content {
            Some(content) => {
                let total = content.published().count();
                let known = content
                    .published()
                    .filter(|item| self.tracker.is_discovered(&item.id))
                    .count();
                writeln!(out, "discovered {}/{} topics", known, total)?;
            }
            None => writeln!(out, "discovered {} topics", found.len())?,
        }
        for id in found {
            writeln!(out, "  {}", id)?;
        }
        Ok(())
    }

    fn print_links(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let Some(content) = &self.content else {
            writeln!(out, "no content listing loaded")?;
            return Ok(());
        };
        let here = self.router.node_id();
        let links = content.links_from(&here);
        if links.is_empty() {
            writeln!(out, "no links from {}", here)?;
        }
        for target in links {
            let mark = if self.tracker.is_discovered(target) { 'x' } else { ' ' };
            writeln!(out, "  [{}] {}  {}", mark, target, self.title(target))?;
        }
        Ok(())
    }

    fn print_topics(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let Some(content) = &self.content else {
            writeln!(out, "no content listing loaded")?;
            return Ok(());
        };
        let here = self.router.node_id();
        for item in content.published() {
            let cursor = if item.id == here { '>' } else { ' ' };
            let mark = if self.tracker.is_discovered(&item.id) { 'x' } else { ' ' };
            writeln!(out, "{} [{}] {}  {}", cursor, mark, item.id, item.meta.title)?;
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for sub in &self.subscriptions {
            sub.unsubscribe();
        }
    }
}

fn push_event(log: &EventLog, line: String) {
    log.lock().unwrap_or_else(PoisonError::into_inner).push(line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use trail_core::ContentItem;
    use trail_nav::UpHistory;

    fn content() -> ContentIndex {
        ContentIndex::from_items([
            ContentItem::new("intro", "Introduction").with_links(["tokens", "hardware"]),
            ContentItem::new("tokens", "Tokens").with_links(["context-window"]),
            ContentItem::new("context-window", "Context window"),
            ContentItem::new("hardware", "Hardware"),
            ContentItem::new("secret", "Secret").draft(),
        ])
    }

    fn session() -> Session {
        Session::new("/intro", RouterConfig::default(), Some(content()))
    }

    fn run(session: &Session, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = session.handle_line(line, &mut out).unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("go tokens").unwrap(), Some(Command::Go("tokens".into())));
        assert_eq!(Command::parse("  drill  x ").unwrap(), Some(Command::Drill("x".into())));
        assert_eq!(Command::parse("up").unwrap(), Some(Command::Up));
        assert_eq!(Command::parse("exit").unwrap(), Some(Command::Quit));
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn parse_errors() {
        assert!(Command::parse("go").is_err());
        assert!(Command::parse("up now").is_err());
        assert!(Command::parse("go a b").is_err());
        assert!(Command::parse("fly").is_err());
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    #[test]
    fn go_is_lateral() {
        let s = session();
        let (_, out) = run(&s, "go tokens");
        assert_eq!(s.router().path(), ["tokens"]);
        assert_eq!(s.host().location(), "/tokens");
        assert!(out.contains("-> tokens (/tokens)"));
    }

    #[test]
    fn drill_up_back_forward() {
        let s = session();
        run(&s, "drill tokens");
        run(&s, "drill context-window");
        assert_eq!(s.router().path(), ["intro", "tokens", "context-window"]);

        run(&s, "up");
        assert_eq!(s.router().path(), ["intro", "tokens"]);

        run(&s, "back");
        assert_eq!(s.router().path(), ["intro", "tokens", "context-window"]);

        run(&s, "forward");
        assert_eq!(s.router().path(), ["intro", "tokens"]);

        let (_, out) = run(&s, "forward");
        assert!(out.contains("no later entry"));
    }

    #[test]
    fn up_at_root_reports() {
        let s = session();
        let (_, out) = run(&s, "up");
        assert!(out.contains("already at the root"));
        assert_eq!(s.host().len(), 1);
    }

    #[test]
    fn up_history_replace_config() {
        let config = RouterConfig {
            up_history: UpHistory::Replace,
            ..Default::default()
        };
        let s = Session::new("/intro", config, None);
        run(&s, "drill tokens");
        run(&s, "up");
        assert_eq!(s.host().len(), 2);
        assert_eq!(s.router().path(), ["intro"]);
    }

    #[test]
    fn replace_keeps_history_length() {
        let s = session();
        run(&s, "replace tokens");
        assert_eq!(s.host().len(), 1);
        assert_eq!(s.host().location(), "/tokens");
    }

    #[test]
    fn unknown_topic_still_navigates() {
        let s = session();
        let (_, out) = run(&s, "go nowhere");
        assert!(out.contains("not in the listing"));
        assert_eq!(s.router().node_id(), "nowhere");
    }

    #[test]
    fn where_uses_titles() {
        let s = session();
        run(&s, "drill tokens");
        let (_, out) = run(&s, "where");
        assert!(out.contains("Introduction › Tokens"));
        assert!(out.contains("url /tokens"));
        assert!(out.contains("depth 2"));
        assert!(out.contains("history 2/2"));
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    #[test]
    fn see_notifies_once_with_link() {
        let s = session();
        let (_, out) = run(&s, "see tokens");
        assert!(out.contains("* discovered tokens via link on intro"));

        let (_, out) = run(&s, "see tokens");
        assert!(out.contains("already discovered"));
        assert!(!out.contains("* discovered"));
    }

    #[test]
    fn seed_is_silent() {
        let s = session();
        let (_, out) = run(&s, "seed tokens");
        assert!(out.contains("seeded tokens"));
        assert!(!out.contains("* discovered"));
        assert!(s.tracker().is_discovered("tokens"));
    }

    #[test]
    fn progress_counts_published_only() {
        let s = session();
        run(&s, "seed tokens");
        run(&s, "seed secret");
        let (_, out) = run(&s, "progress");
        assert!(out.contains("discovered 1/4 topics"));
    }

    #[test]
    fn reset_keeps_observer() {
        let s = session();
        run(&s, "see tokens");
        run(&s, "reset");
        assert_eq!(s.tracker().discovered_count(), 0);
        let (_, out) = run(&s, "see tokens");
        assert!(out.contains("* discovered tokens"));
    }

    #[test]
    fn links_marks_discovered() {
        let s = session();
        run(&s, "seed hardware");
        let (_, out) = run(&s, "links");
        assert!(out.contains("[ ] tokens"));
        assert!(out.contains("[x] hardware"));
    }

    #[test]
    fn topics_skip_drafts() {
        let s = session();
        let (_, out) = run(&s, "topics");
        assert!(out.contains("> [ ] intro"));
        assert!(!out.contains("secret"));
    }

    #[test]
    fn listing_commands_without_content() {
        let s = Session::new("/intro", RouterConfig::default(), None);
        let (_, out) = run(&s, "links");
        assert!(out.contains("no content listing loaded"));
        let (_, out) = run(&s, "progress");
        assert!(out.contains("discovered 0 topics"));
    }

    // ========================================================================
    // Flow
    // ========================================================================

    #[test]
    fn quit_and_errors() {
        let s = session();
        let (flow, out) = run(&s, "bogus");
        assert_eq!(flow, Flow::Continue);
        assert!(out.starts_with("error: unknown command"));

        let (flow, _) = run(&s, "quit");
        assert_eq!(flow, Flow::Quit);
    }

    #[test]
    fn subscriptions_detach() {
        let s = session();
        let tracker_subs = s.tracker().subscriber_count();
        assert_eq!(tracker_subs, 1);
        assert_eq!(s.router().route().subscriber_count(), 1);
        for sub in &s.subscriptions {
            assert!(sub.unsubscribe());
        }
        assert_eq!(s.tracker().subscriber_count(), 0);
    }
}
