use crate::error::OcrError;
use crate::models::config::ScoringConfig;
use crate::models::equipment::{EquipmentPiece, EquipmentSet, ExtractionState, Slot};
use crate::models::score::ScoreResult;
use crate::models::stat::{StatKey, StatMap};
use crate::services::aggregator::aggregate;
use crate::services::ocr::{extract_stats, OcrEngine};
use crate::services::scoring::ScoringProfile;
use image::DynamicImage;
use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// How a submitted extraction ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ExtractionOutcome {
    /// Result stored on the piece
    Applied { stats: StatMap },
    /// A newer submission (or a reset) for the same slot came first
    Superseded,
    /// Recognition failed; the piece went back to its previous state
    Failed { reason: String },
}

/// Score of one piece as shown next to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieceReport {
    pub slot: Slot,
    pub state: ExtractionState,
    pub result: ScoreResult,
    pub recommended: bool,
}

/// Full scoring snapshot of the current set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetReport {
    pub pieces: Vec<PieceReport>,
    pub set: ScoreResult,
    pub aggregate: StatMap,
    pub top_stats: Vec<StatKey>,
}

struct SlotRecord {
    piece: EquipmentPiece,
    /// Sequence number of the newest request for this slot
    latest_request: u64,
    /// State from before the oldest request still in flight
    settled: Option<SettledState>,
}

/// What submission overwrote, put back if recognition fails
struct SettledState {
    state: ExtractionState,
    raw_text: Option<String>,
    progress: u8,
}

impl SettledState {
    fn restore(self, piece: &mut EquipmentPiece) {
        piece.raw_text = self.raw_text;
        piece.progress = self.progress;
        // A manual edit made while extracting still counts as a reading
        piece.state = match self.state {
            ExtractionState::Empty if !piece.stats.is_empty() => ExtractionState::Extracted,
            state => state,
        };
    }
}

type Slots = Arc<Mutex<Vec<SlotRecord>>>;

/// The 8 pieces being graded, with concurrent per-slot extraction.
///
/// Every slot can have at most one *current* request. Submitting again for
/// the same slot supersedes the earlier request: its progress and result are
/// dropped when they arrive. Submissions must happen inside a tokio runtime.
pub struct ExtractionSession<E: OcrEngine + 'static> {
    engine: Arc<E>,
    slots: Slots,
}

impl<E: OcrEngine + 'static> ExtractionSession<E> {
    pub fn new(engine: E) -> Self {
        Self::with_engine(Arc::new(engine))
    }

    pub fn with_engine(engine: Arc<E>) -> Self {
        let slots = Slot::ALL
            .iter()
            .map(|&slot| SlotRecord {
                piece: EquipmentPiece::new(slot),
                latest_request: 0,
                settled: None,
            })
            .collect();

        Self {
            engine,
            slots: Arc::new(Mutex::new(slots)),
        }
    }

    /// Start extracting stats from an already decoded panel image
    pub fn submit(&self, slot: Slot, image: DynamicImage) -> JoinHandle<ExtractionOutcome> {
        self.spawn_extraction(slot, move || Ok(image))
    }

    /// Start extracting stats from an image file; decoding runs off the async threads
    pub fn submit_file(&self, slot: Slot, path: impl Into<PathBuf>) -> JoinHandle<ExtractionOutcome> {
        let path = path.into();
        self.spawn_extraction(slot, move || Ok(image::open(&path)?))
    }

    fn spawn_extraction<F>(&self, slot: Slot, load: F) -> JoinHandle<ExtractionOutcome>
    where
        F: FnOnce() -> Result<DynamicImage, OcrError> + Send + 'static,
    {
        let seq = self.begin(slot);
        let engine = Arc::clone(&self.engine);
        let slots = Arc::clone(&self.slots);

        tokio::spawn(async move {
            let progress_slots = Arc::clone(&slots);
            let recognized = tokio::task::spawn_blocking(move || {
                let image = load()?;
                let progress = |value: u8| update_progress(&progress_slots, slot, seq, value);
                engine.recognize(&image, &progress)
            })
            .await;

            let text = match recognized {
                Ok(result) => result,
                Err(e) => Err(OcrError::Task(e.to_string())),
            };

            finish(&slots, slot, seq, text)
        })
    }

    /// Mark the slot as extracting under a fresh sequence number.
    ///
    /// A resubmission while a request is in flight keeps the state saved by
    /// the first one, so a failure always falls back to a settled piece.
    fn begin(&self, slot: Slot) -> u64 {
        let mut slots = self.slots.lock();
        let record = &mut slots[slot.index()];

        record.latest_request += 1;
        if record.settled.is_none() {
            record.settled = Some(SettledState {
                state: record.piece.state,
                raw_text: record.piece.raw_text.take(),
                progress: record.piece.progress,
            });
        }
        record.piece.state = ExtractionState::Extracting;
        record.piece.progress = 0;

        tracing::debug!("{}: extraction request {} started", slot, record.latest_request);
        record.latest_request
    }

    /// Manual correction. `None` or a non-finite value clears the stat.
    pub fn set_stat(&self, slot: Slot, key: StatKey, value: Option<f64>) {
        let mut slots = self.slots.lock();
        slots[slot.index()].piece.set_stat(key, value);
    }

    /// Clear a slot. An extraction still running for it is discarded.
    pub fn reset(&self, slot: Slot) {
        let mut slots = self.slots.lock();
        let record = &mut slots[slot.index()];
        record.latest_request += 1;
        record.settled = None;
        record.piece.reset();
    }

    pub fn reset_all(&self) {
        for slot in Slot::ALL {
            self.reset(slot);
        }
    }

    pub fn piece(&self, slot: Slot) -> EquipmentPiece {
        self.slots.lock()[slot.index()].piece.clone()
    }

    /// Snapshot of all pieces in slot order
    pub fn pieces(&self) -> EquipmentSet {
        let slots = self.slots.lock();
        std::array::from_fn(|i| slots[i].piece.clone())
    }

    pub fn aggregate(&self) -> StatMap {
        let slots = self.slots.lock();
        aggregate(slots.iter().map(|r| &r.piece))
    }

    /// Score every piece and the set as a whole
    pub fn report(&self, profile: &ScoringProfile, scoring: &ScoringConfig) -> SetReport {
        let pieces = self.pieces();

        let piece_reports = pieces
            .iter()
            .map(|piece| {
                let result = profile.score_piece(&piece.stats);
                PieceReport {
                    slot: piece.slot,
                    state: piece.state,
                    result,
                    recommended: result.meets(scoring.recommend_threshold),
                }
            })
            .collect();

        SetReport {
            pieces: piece_reports,
            set: profile.score_set(&pieces),
            aggregate: aggregate(&pieces),
            top_stats: profile.top_stats(scoring.top_stats),
        }
    }
}

fn update_progress(slots: &Mutex<Vec<SlotRecord>>, slot: Slot, seq: u64, value: u8) {
    let mut slots = slots.lock();
    let record = &mut slots[slot.index()];

    if record.latest_request != seq || !record.piece.is_extracting() {
        return;
    }

    let value = value.min(100);
    if value > record.piece.progress {
        record.piece.progress = value;
    }
}

fn finish(
    slots: &Mutex<Vec<SlotRecord>>,
    slot: Slot,
    seq: u64,
    text: Result<String, OcrError>,
) -> ExtractionOutcome {
    let mut slots = slots.lock();
    let record = &mut slots[slot.index()];

    if record.latest_request != seq {
        tracing::debug!(
            "{}: discarding result of request {} (latest is {})",
            slot,
            seq,
            record.latest_request
        );
        return ExtractionOutcome::Superseded;
    }

    match text {
        Ok(text) => {
            let stats = extract_stats(&text);
            tracing::info!("{}: extracted {} stats", slot, stats.len());
            record.settled = None;
            record.piece.apply_extraction(text, stats.clone());
            ExtractionOutcome::Applied { stats }
        }
        Err(e) => {
            tracing::warn!("{}: recognition failed: {}", slot, e);
            match record.settled.take() {
                Some(settled) => settled.restore(&mut record.piece),
                None if record.piece.stats.is_empty() => record.piece.state = ExtractionState::Empty,
                None => record.piece.state = ExtractionState::Extracted,
            }
            ExtractionOutcome::Failed { reason: e.to_string() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::mpsc;

    /// Returns a fixed answer after reporting some progress
    struct FixedEngine {
        answer: Result<String, String>,
    }

    impl OcrEngine for FixedEngine {
        fn recognize(&self, _image: &DynamicImage, progress: &dyn Fn(u8)) -> Result<String, OcrError> {
            progress(50);
            self.answer.clone().map_err(OcrError::Server)
        }
    }

    fn fixed(text: &str) -> ExtractionSession<FixedEngine> {
        ExtractionSession::new(FixedEngine {
            answer: Ok(text.to_string()),
        })
    }

    fn failing() -> ExtractionSession<FixedEngine> {
        ExtractionSession::new(FixedEngine {
            answer: Err("server down".to_string()),
        })
    }

    /// Blocks each recognition until the test releases it.
    /// Requests are told apart by image width.
    struct GatedEngine {
        gates: Mutex<HashMap<u32, mpsc::Receiver<String>>>,
    }

    impl GatedEngine {
        fn new() -> Self {
            Self {
                gates: Mutex::new(HashMap::new()),
            }
        }

        fn gate(&self, width: u32) -> mpsc::Sender<String> {
            let (tx, rx) = mpsc::channel();
            self.gates.lock().insert(width, rx);
            tx
        }
    }

    impl OcrEngine for GatedEngine {
        fn recognize(&self, image: &DynamicImage, _progress: &dyn Fn(u8)) -> Result<String, OcrError> {
            let rx = self
                .gates
                .lock()
                .remove(&image.width())
                .ok_or_else(|| OcrError::Task("no gate".to_string()))?;
            rx.recv().map_err(|e| OcrError::Task(e.to_string()))
        }
    }

    fn image(width: u32) -> DynamicImage {
        DynamicImage::new_rgba8(width, 4)
    }

    #[tokio::test]
    async fn test_submit_applies_stats() {
        let session = fixed("Crit Rate +8,4%\nATK +120");

        let outcome = session.submit(Slot::Ring, image(1)).await.unwrap();

        let piece = session.piece(Slot::Ring);
        assert_eq!(piece.state, ExtractionState::Extracted);
        assert_eq!(piece.progress, 100);
        assert_eq!(piece.stats.get(StatKey::CritRate), Some(8.4));
        assert_eq!(piece.stats.get(StatKey::AtkFlat), Some(120.0));
        assert_eq!(piece.raw_text.as_deref(), Some("Crit Rate +8,4%\nATK +120"));
        assert_eq!(outcome, ExtractionOutcome::Applied { stats: piece.stats });
    }

    #[tokio::test]
    async fn test_unrecognized_text_gives_empty_stats() {
        let session = fixed("Legendary Ring\nLv. 60");

        let outcome = session.submit(Slot::Ring, image(1)).await.unwrap();
        assert_eq!(outcome, ExtractionOutcome::Applied { stats: StatMap::new() });
        assert_eq!(session.piece(Slot::Ring).state, ExtractionState::Extracted);
    }

    #[tokio::test]
    async fn test_submit_marks_extracting() {
        let engine = Arc::new(GatedEngine::new());
        let release = engine.gate(1);
        let session = ExtractionSession::with_engine(Arc::clone(&engine));

        let handle = session.submit(Slot::Boots, image(1));
        let piece = session.piece(Slot::Boots);
        assert!(piece.is_extracting());
        assert_eq!(piece.progress, 0);

        release.send("SPD +4".to_string()).unwrap();
        handle.await.unwrap();
        assert_eq!(session.piece(Slot::Boots).stats.get(StatKey::Speed), Some(4.0));
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let engine = Arc::new(GatedEngine::new());
        let first = engine.gate(1);
        let second = engine.gate(2);
        let session = ExtractionSession::with_engine(Arc::clone(&engine));

        let h1 = session.submit(Slot::Helmet, image(1));
        let h2 = session.submit(Slot::Helmet, image(2));

        second.send("ATK +50".to_string()).unwrap();
        assert!(matches!(h2.await.unwrap(), ExtractionOutcome::Applied { .. }));

        first.send("HP +999".to_string()).unwrap();
        assert_eq!(h1.await.unwrap(), ExtractionOutcome::Superseded);

        let piece = session.piece(Slot::Helmet);
        assert_eq!(piece.stats.get(StatKey::AtkFlat), Some(50.0));
        assert_eq!(piece.stats.get(StatKey::HpFlat), None);
        assert_eq!(piece.raw_text.as_deref(), Some("ATK +50"));
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let engine = Arc::new(GatedEngine::new());
        let ring = engine.gate(1);
        let boots = engine.gate(2);
        let session = ExtractionSession::with_engine(Arc::clone(&engine));

        let h_ring = session.submit(Slot::Ring, image(1));
        let h_boots = session.submit(Slot::Boots, image(2));

        boots.send("SPD +3".to_string()).unwrap();
        ring.send("Crit DMG +12%".to_string()).unwrap();

        assert!(matches!(h_ring.await.unwrap(), ExtractionOutcome::Applied { .. }));
        assert!(matches!(h_boots.await.unwrap(), ExtractionOutcome::Applied { .. }));
        assert_eq!(session.piece(Slot::Ring).stats.get(StatKey::CritDmg), Some(12.0));
        assert_eq!(session.piece(Slot::Boots).stats.get(StatKey::Speed), Some(3.0));
    }

    #[tokio::test]
    async fn test_failure_restores_previous_reading() {
        let session = failing();
        session.set_stat(Slot::Gloves, StatKey::DefPct, Some(6.0));

        let outcome = session.submit(Slot::Gloves, image(1)).await.unwrap();
        assert!(matches!(outcome, ExtractionOutcome::Failed { .. }));

        let piece = session.piece(Slot::Gloves);
        assert_eq!(piece.state, ExtractionState::Extracted);
        assert_eq!(piece.stats.get(StatKey::DefPct), Some(6.0));
    }

    #[tokio::test]
    async fn test_failed_resubmission_restores_settled_piece() {
        let engine = Arc::new(GatedEngine::new());
        let first = engine.gate(1);
        let second = engine.gate(2);
        let session = ExtractionSession::with_engine(Arc::clone(&engine));

        let earlier = fixed("Crit Rate +7%");
        earlier.submit(Slot::Ring, image(1)).await.unwrap();
        let settled = earlier.piece(Slot::Ring);

        session.slots.lock()[Slot::Ring.index()].piece = settled.clone();

        let h1 = session.submit(Slot::Ring, image(1));
        let h2 = session.submit(Slot::Ring, image(2));

        // Dropping the sender makes the newer recognition fail
        drop(second);
        assert!(matches!(h2.await.unwrap(), ExtractionOutcome::Failed { .. }));

        first.send("ATK +10".to_string()).unwrap();
        assert_eq!(h1.await.unwrap(), ExtractionOutcome::Superseded);

        let piece = session.piece(Slot::Ring);
        assert_eq!(piece.state, ExtractionState::Extracted);
        assert_eq!(piece.progress, 100);
        assert_eq!(piece.raw_text.as_deref(), Some("Crit Rate +7%"));
        assert_eq!(piece.stats.get(StatKey::CritRate), Some(7.0));
        assert_eq!(piece.stats.get(StatKey::AtkFlat), None);
    }

    #[tokio::test]
    async fn test_failed_resubmission_of_empty_piece() {
        let engine = Arc::new(GatedEngine::new());
        let first = engine.gate(1);
        let second = engine.gate(2);
        let session = ExtractionSession::with_engine(Arc::clone(&engine));

        let h1 = session.submit(Slot::Helmet, image(1));
        let h2 = session.submit(Slot::Helmet, image(2));

        drop(second);
        assert!(matches!(h2.await.unwrap(), ExtractionOutcome::Failed { .. }));
        drop(first);
        assert_eq!(h1.await.unwrap(), ExtractionOutcome::Superseded);

        assert_eq!(session.piece(Slot::Helmet), EquipmentPiece::new(Slot::Helmet));
    }

    #[tokio::test]
    async fn test_failure_on_empty_piece_stays_empty() {
        let session = failing();

        session.submit(Slot::Armor, image(1)).await.unwrap();
        assert_eq!(session.piece(Slot::Armor), EquipmentPiece::new(Slot::Armor));
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let session = fixed("ATK +10");

        let outcome = session
            .submit_file(Slot::Necklace, "/nonexistent/gear-grader/panel.png")
            .await
            .unwrap();

        assert!(matches!(outcome, ExtractionOutcome::Failed { .. }));
        assert_eq!(session.piece(Slot::Necklace).state, ExtractionState::Empty);
    }

    #[tokio::test]
    async fn test_reset_discards_running_extraction() {
        let engine = Arc::new(GatedEngine::new());
        let release = engine.gate(1);
        let session = ExtractionSession::with_engine(Arc::clone(&engine));

        let handle = session.submit(Slot::Bracelet, image(1));
        session.reset(Slot::Bracelet);

        release.send("ATK +10".to_string()).unwrap();
        assert_eq!(handle.await.unwrap(), ExtractionOutcome::Superseded);
        assert_eq!(session.piece(Slot::Bracelet), EquipmentPiece::new(Slot::Bracelet));
    }

    #[test]
    fn test_progress_is_monotonic_and_current_only() {
        let session = fixed("");
        let seq = session.begin(Slot::Earrings);

        update_progress(&session.slots, Slot::Earrings, seq, 40);
        update_progress(&session.slots, Slot::Earrings, seq, 20);
        assert_eq!(session.piece(Slot::Earrings).progress, 40);

        update_progress(&session.slots, Slot::Earrings, seq, 250);
        assert_eq!(session.piece(Slot::Earrings).progress, 100);

        let newer = session.begin(Slot::Earrings);
        update_progress(&session.slots, Slot::Earrings, seq, 90);
        assert_eq!(session.piece(Slot::Earrings).progress, 0);

        update_progress(&session.slots, Slot::Earrings, newer, 10);
        assert_eq!(session.piece(Slot::Earrings).progress, 10);
    }

    #[test]
    fn test_manual_edits_and_reset_all() {
        let session = fixed("");
        session.set_stat(Slot::Ring, StatKey::CritRate, Some(7.0));
        session.set_stat(Slot::Ring, StatKey::Speed, Some(f64::NAN));
        session.set_stat(Slot::Helmet, StatKey::CritRate, Some(3.0));

        assert_eq!(session.piece(Slot::Ring).stats.len(), 1);
        assert_eq!(session.aggregate().get(StatKey::CritRate), Some(10.0));

        session.set_stat(Slot::Ring, StatKey::CritRate, None);
        assert_eq!(session.aggregate().get(StatKey::CritRate), Some(3.0));

        session.reset_all();
        assert!(session.aggregate().is_empty());
        assert!(session.pieces().iter().all(|p| p.state == ExtractionState::Empty));
    }

    #[test]
    fn test_report() {
        use crate::models::stat::StatKey::*;
        use crate::models::weights::{BenchmarkTable, WeightVector};

        let session = fixed("");
        session.set_stat(Slot::Ring, CritRate, Some(10.0));
        session.set_stat(Slot::Boots, CritRate, Some(2.0));

        let weights: WeightVector = [(CritRate, 1.0)].into_iter().collect();
        let profile = ScoringProfile::new(weights, BenchmarkTable::default());
        let report = session.report(&profile, &ScoringConfig::default());

        assert_eq!(report.pieces.len(), Slot::COUNT);
        let ring = &report.pieces[Slot::Ring.index()];
        assert_eq!(ring.result.score, 100);
        assert!(ring.recommended);
        let boots = &report.pieces[Slot::Boots.index()];
        assert_eq!(boots.result.score, 20);
        assert!(!boots.recommended);

        // 12 / (10 * 8)
        assert_eq!(report.set.score, 15);
        assert_eq!(report.aggregate.get(CritRate), Some(12.0));
        assert_eq!(report.top_stats, vec![CritRate, AtkPct, AtkFlat]);
    }
}
