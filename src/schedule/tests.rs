use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, NaiveTime, TimeDelta, TimeZone, Timelike};

use super::*;
use crate::audio::AudioPlayer;
use crate::library::{Library, SharedLibrary};
use crate::session::{Session, SessionEvent};
use crate::testutil::{FakeBackend, FakeProbe, ManualClock, track};

fn noon() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
}

fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap()
}

#[test]
fn time_of_day_round_trips_through_the_formatter() {
    for h in 0..24 {
        for m in [0, 1, 30, 59] {
            for s in [0, 9, 59] {
                let text = format!("{h}:{m}:{s}");
                let t = parse_time_of_day(&text).unwrap();
                assert_eq!(t, hms(h, m, s));
                let formatted = t.format("%H:%M:%S").to_string();
                assert_eq!(parse_time_of_day(&formatted).unwrap(), t);
            }
        }
    }
}

#[test]
fn bad_times_are_rejected() {
    for bad in [
        "24:00:00", "12:60:00", "12:00:60", "12:00", "1:2:3:4", "a:b:c", "", "-1:00:00",
        "12::00", "12:00:00pm",
    ] {
        assert!(parse_time_of_day(bad).is_err(), "{bad:?} should not parse");
    }
    assert_eq!(
        parse_time_of_day("25:00:00"),
        Err(TimeParseError::OutOfRange {
            field: "hour",
            value: 25
        })
    );
}

#[test]
fn durations_accept_two_or_three_fields() {
    assert_eq!(parse_duration("0:5"), Ok(5));
    assert_eq!(parse_duration("10:00"), Ok(600));
    assert_eq!(parse_duration("00:10:00"), Ok(600));
    assert_eq!(parse_duration("1:00:00"), Ok(3600));
    assert_eq!(parse_duration(" 100:0:0 "), Ok(360_000));

    for bad in ["5", "0:60", "1:60:00", "1:00:60", "1:2:3:4", "x:1", "", "-1:0:0"] {
        assert!(parse_duration(bad).is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn format_hms_pads_and_grows() {
    assert_eq!(format_hms(0), "00:00:00");
    assert_eq!(format_hms(3725), "01:02:05");
    assert_eq!(format_hms(360_000), "100:00:00");
    assert_eq!(parse_duration(&format_hms(5_025)), Ok(5_025));
}

#[test]
fn next_occurrence_is_today_when_still_ahead() {
    let target = next_occurrence(noon(), hms(13, 30, 0));
    assert_eq!(target, Local.with_ymd_and_hms(2026, 6, 15, 13, 30, 0).unwrap());
}

#[test]
fn next_occurrence_rolls_to_tomorrow_once_passed() {
    let target = next_occurrence(noon(), hms(11, 59, 59));
    assert_eq!(target, Local.with_ymd_and_hms(2026, 6, 16, 11, 59, 59).unwrap());
}

#[test]
fn next_occurrence_never_precedes_now() {
    let now = noon() + TimeDelta::milliseconds(500);
    assert_eq!(next_occurrence(now, hms(12, 0, 0)), now);

    for (h, m, s) in [(0, 0, 0), (11, 0, 0), (12, 0, 1), (23, 59, 59)] {
        assert!(next_occurrence(now, hms(h, m, s)) >= now);
    }
}

#[test]
fn job_ids_keep_growing_across_sweeps() {
    let mut list = JobList::default();
    let a = list.push(noon(), 10);
    assert!(list.mark_running(a.id));
    assert!(list.mark_completed(a.id));
    assert_eq!(list.sweep(), 1);

    let b = list.push(noon(), 10);
    assert!(b.id > a.id);
}

#[test]
fn status_only_moves_forward_one_step_at_a_time() {
    let mut list = JobList::default();
    let job = list.push(noon(), 10);

    assert!(!list.mark_completed(job.id));
    assert!(list.mark_running(job.id));
    assert!(!list.mark_running(job.id));
    assert!(list.mark_completed(job.id));
    assert!(!list.mark_completed(job.id));
    assert_eq!(list.get(job.id).unwrap().status, JobStatus::Completed);
}

#[test]
fn sweep_only_removes_completed_jobs() {
    let mut list = JobList::default();
    let pending = list.push(noon(), 1);
    let running = list.push(noon(), 1);
    let done = list.push(noon(), 1);
    list.mark_running(running.id);
    list.mark_running(done.id);
    list.mark_completed(done.id);

    assert_eq!(list.sweep(), 1);
    let ids: Vec<JobId> = list.jobs().iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![pending.id, running.id]);
}

#[test]
fn due_orders_by_target_then_id() {
    let mut list = JobList::default();
    let late = list.push(noon() - TimeDelta::seconds(5), 1);
    let early = list.push(noon() - TimeDelta::seconds(10), 1);
    let tie = list.push(noon() - TimeDelta::seconds(10), 1);
    let future = list.push(noon() + TimeDelta::seconds(1), 1);

    assert_eq!(list.due(noon()), vec![early.id, tie.id, late.id]);
    assert!(!list.due(noon()).contains(&future.id));
}

struct Rig {
    scheduler: Scheduler,
    session: Session,
    jobs: JobBoard,
    events: Receiver<SessionEvent>,
}

fn rig(library_paths: &[&str], probe: FakeProbe, clock: ManualClock) -> Rig {
    let player = AudioPlayer::new(Box::new(FakeBackend::default()), 0.7).shared();
    let jobs = JobBoard::new();
    let (tx, events) = mpsc::channel();
    let session = Session::new(
        player,
        Arc::new(probe),
        Arc::new(clock),
        jobs.clone(),
        tx,
        Duration::from_millis(100),
    );

    let mut library = Library::new();
    library.replace(
        std::path::Path::new("/music"),
        library_paths.iter().map(|p| track(p)).collect(),
    );
    let library: SharedLibrary = Arc::new(Mutex::new(library));

    Rig {
        scheduler: Scheduler::new(jobs.clone(), session.clone(), library),
        session,
        jobs,
        events,
    }
}

fn status_of(jobs: &JobBoard, id: JobId) -> Option<JobStatus> {
    jobs.snapshot().into_iter().find(|j| j.id == id).map(|j| j.status)
}

fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn scheduled_job_fires_plays_and_is_swept() {
    let r = rig(&["a"], FakeProbe::new(&[("a", 30)]), ManualClock::instant());
    let now = noon();
    let job = r.jobs.add(now + TimeDelta::seconds(1), parse_duration("0:5").unwrap());

    assert_eq!(r.scheduler.tick(now), None);
    assert_eq!(status_of(&r.jobs, job.id), Some(JobStatus::Pending));

    assert_eq!(r.scheduler.tick(now + TimeDelta::seconds(1)), Some(job.id));
    assert_ne!(status_of(&r.jobs, job.id), Some(JobStatus::Pending));

    assert_eq!(
        r.events.recv_timeout(Duration::from_secs(5)).unwrap(),
        SessionEvent::Completed
    );
    assert_eq!(status_of(&r.jobs, job.id), Some(JobStatus::Completed));
    assert!(!r.session.is_active());

    assert_eq!(r.scheduler.tick(now + TimeDelta::seconds(6)), None);
    assert!(r.jobs.snapshot().is_empty());
}

#[test]
fn earliest_due_job_wins_and_the_rest_wait() {
    let r = rig(
        &["long"],
        FakeProbe::new(&[("long", 1_000)]),
        ManualClock::with_real_pause(Duration::from_millis(2)),
    );
    let now = noon();
    let later = r.jobs.add(now - TimeDelta::seconds(5), 600);
    let earlier = r.jobs.add(now - TimeDelta::seconds(10), 600);

    assert_eq!(r.scheduler.tick(now), Some(earlier.id));
    assert_eq!(status_of(&r.jobs, earlier.id), Some(JobStatus::Running));
    assert_eq!(status_of(&r.jobs, later.id), Some(JobStatus::Pending));

    // Busy: nothing else fires.
    assert_eq!(r.scheduler.tick(now + TimeDelta::seconds(1)), None);
    assert_eq!(status_of(&r.jobs, later.id), Some(JobStatus::Pending));

    r.session.stop();
    assert_eq!(status_of(&r.jobs, earlier.id), Some(JobStatus::Completed));

    assert_eq!(r.scheduler.tick(now + TimeDelta::seconds(2)), Some(later.id));
    assert_eq!(status_of(&r.jobs, earlier.id), None);
    assert_eq!(status_of(&r.jobs, later.id), Some(JobStatus::Running));

    r.session.stop();
}

#[test]
fn due_job_waits_for_a_manual_session_to_end() {
    let r = rig(
        &["long"],
        FakeProbe::new(&[("long", 1_000)]),
        ManualClock::with_real_pause(Duration::from_millis(2)),
    );
    r.session.start(vec![track("long")], 600, None).unwrap();
    let job = r.jobs.add(noon(), 60);

    assert_eq!(r.scheduler.tick(noon()), None);
    assert_eq!(status_of(&r.jobs, job.id), Some(JobStatus::Pending));

    r.session.stop();
    wait_until(|| !r.session.is_active());
    assert_eq!(r.scheduler.tick(noon()), Some(job.id));

    r.session.stop();
    assert_eq!(status_of(&r.jobs, job.id), Some(JobStatus::Completed));
}

#[test]
fn job_firing_on_an_empty_library_completes_and_reports() {
    let r = rig(&[], FakeProbe::default(), ManualClock::instant());
    let job = r.jobs.add(noon(), 60);

    assert_eq!(r.scheduler.tick(noon()), Some(job.id));
    // Completed and swept in the same pass.
    assert!(r.jobs.snapshot().is_empty());
    assert!(matches!(
        r.events.recv_timeout(Duration::from_secs(1)),
        Ok(SessionEvent::Failed(_))
    ));
}

#[test]
fn spawned_scheduler_fires_on_its_own_until_stopped() {
    let r = rig(&["a"], FakeProbe::new(&[("a", 10)]), ManualClock::instant());
    let job = r.jobs.add(Local::now().with_nanosecond(0).unwrap(), 1);

    let mut handle = r.scheduler.clone().spawn(Duration::from_millis(20)).unwrap();
    assert!(handle.is_running());

    assert_eq!(
        r.events.recv_timeout(Duration::from_secs(5)).unwrap(),
        SessionEvent::Completed
    );
    wait_until(|| status_of(&r.jobs, job.id).is_none());

    handle.stop();
    assert!(!handle.is_running());
}
