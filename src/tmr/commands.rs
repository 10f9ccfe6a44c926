//! `tmr` console client: `status` and `test` sub-commands.

use core::fmt;

use super::{CallbackAction, TimerCallback, TimerId, TimerState, Timers};
use crate::cmd::{parse_args, Client, CommandHandler, CommandMeta};
use crate::error::Error;
use crate::log_debug;

/// Client name.
pub const NAME: &str = "tmr";

/// Sub-command table.
pub const COMMANDS: &[CommandMeta] = &[
    CommandMeta::new("status", "Get module status, usage: tmr status"),
    CommandMeta::new(
        "test",
        "Run test, usage: tmr test [<op> [<arg1> [<arg2>]]] (enter no op/args for help)",
    ),
];

const TEST_USAGE: &str = "Test operations and param(s) are as follows:
  Get a non-callback tmr, usage: tmr test get <ms>
  Get a callback tmr, usage: tmr test get_cb <ms> <cb-user-data>
  Start a tmr, usage: tmr test start <tmr-id> <ms>
  Release a tmr, usage: tmr test release <tmr-id>
  Check if expired, usage: tmr test is_expired <tmr-id>
";

/// Callback used by `tmr test get_cb`: restarts when user data is 0.
struct TestCallback;

impl TimerCallback for TestCallback {
    fn expired(&self, timers: &Timers<'_>, id: TimerId, user_data: u32) -> CallbackAction {
        log_debug!(
            timers.log_level(),
            "test callback tmr_id={} user_data={}",
            id.index(),
            user_data
        );
        if user_data == 0 {
            CallbackAction::Restart
        } else {
            CallbackAction::Stop
        }
    }
}

static TEST_CALLBACK: TestCallback = TestCallback;

/// Console handler for a timer pool.
#[derive(Debug)]
pub struct TimerCommands<'t, 'a> {
    timers: &'t Timers<'a>,
}

impl<'t, 'a> TimerCommands<'t, 'a> {
    /// Handler over `timers`.
    pub const fn new(timers: &'t Timers<'a>) -> Self {
        Self { timers }
    }

    /// The `tmr` client, exposing the pool's log level.
    pub fn client(&'t self) -> Client<'t> {
        Client::new(NAME, COMMANDS, self).with_log_level(self.timers.log_level())
    }

    fn status(&self, out: &mut dyn fmt::Write) -> Result<(), Error> {
        let now = self.timers.now_ms();
        writeln!(out, "Current millisecond tmr={}\n", now).ok();
        writeln!(out, "ID   Period   Start time Time left  CB User data  State").ok();
        writeln!(out, "-- ---------- ---------- ---------- -- ---------- ------").ok();

        for idx in 0..self.timers.capacity() {
            let info = self.timers.info(TimerId::new(idx))?;
            if info.state == TimerState::Unused {
                continue;
            }
            let left = if info.state == TimerState::Running {
                info.period_ms
                    .saturating_sub(now.wrapping_sub(info.start_ms))
            } else {
                0
            };
            writeln!(
                out,
                "{:2} {:10} {:10} {:10} {:>2} {:10} {}",
                idx,
                info.period_ms,
                info.start_ms,
                left,
                if info.has_callback { "Y" } else { "N" },
                info.user_data,
                info.state.as_str()
            )
            .ok();
        }
        Ok(())
    }

    fn test(&self, out: &mut dyn fmt::Write, args: &[&str]) -> Result<(), Error> {
        if args.len() == 2 {
            out.write_str(TEST_USAGE).ok();
            return Ok(());
        }
        if args.len() < 4 {
            writeln!(out, "Insufficient arguments").ok();
            return Err(Error::BadCommand);
        }

        let op = args[2];
        let two = op.eq_ignore_ascii_case("get_cb") || op.eq_ignore_ascii_case("start");
        let values = parse_args(&args[3..], if two { "uu" } else { "u" }, out)?;
        let param1 = values[0].as_u32().unwrap_or(0);
        let param2 = values.get(1).and_then(|v| v.as_u32()).unwrap_or(0);
        let id = TimerId::new(param1 as usize);

        let rc = if op.eq_ignore_ascii_case("get") {
            self.timers.acquire(param1, None, 0).map(|id| id.index() as i64)
        } else if op.eq_ignore_ascii_case("get_cb") {
            self.timers
                .acquire(param1, Some(&TEST_CALLBACK), param2)
                .map(|id| id.index() as i64)
        } else if op.eq_ignore_ascii_case("start") {
            self.timers.arm(id, param2).map(|()| 0)
        } else if op.eq_ignore_ascii_case("release") {
            self.timers.release(id).map(|()| 0)
        } else if op.eq_ignore_ascii_case("is_expired") {
            self.timers.is_expired(id).map(i64::from)
        } else {
            writeln!(out, "Invalid operation '{}'", op).ok();
            return Err(Error::BadCommand);
        };

        let code = rc.unwrap_or_else(|e| i64::from(e.code()));
        writeln!(out, "Operation returns {}", code).ok();
        Ok(())
    }
}

impl CommandHandler for TimerCommands<'_, '_> {
    fn execute(&self, cmd: &str, out: &mut dyn fmt::Write, args: &[&str]) -> Result<(), Error> {
        match cmd {
            "status" => self.status(out),
            "test" => self.test(out, args),
            _ => Err(Error::BadCommand),
        }
    }
}
