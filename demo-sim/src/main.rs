use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytecodec::{ByteReader, Endian};
use clap::{Parser, ValueEnum};
use delta::DeltaRecord;
use demo_schema::{client_config, server_config, CreatureStatus};
use history::{EntityId, History, HistoryError, Seq, SyncMode, Tick};
use log::{debug, info};
use serde::Serialize;
use snapsync_tools::{inspect_packet, schema_report};

#[derive(Parser)]
#[command(
    name = "demo-sim",
    version,
    about = "Deterministic server/client replication over a lossy link"
)]
struct Cli {
    /// Number of simulated creatures.
    #[arg(long, default_value_t = 16)]
    creatures: u32,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 300)]
    ticks: u32,
    /// RNG seed for deterministic results.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Percentage of server packets lost on the way to the client.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(0..=100))]
    drop_percent: u32,
    /// Percentage of client acknowledgements lost on the way back.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(0..=100))]
    ack_loss_percent: u32,
    /// Optional cadence at which every creature swaps equipment.
    #[arg(long)]
    burst_every: Option<u32>,
    /// Byte order used on the wire.
    #[arg(long, value_enum, default_value_t = EndianArg::Little)]
    endian: EndianArg,
    /// Output directory for captures.
    #[arg(long, default_value = "captures")]
    out_dir: PathBuf,
    /// Fail if p95 incremental packet size exceeds this value.
    #[arg(long)]
    max_p95_bytes: Option<u64>,
    /// Fail if average incremental packet size exceeds this value.
    #[arg(long)]
    max_avg_bytes: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum EndianArg {
    Little,
    Big,
}

impl From<EndianArg> for Endian {
    fn from(arg: EndianArg) -> Self {
        match arg {
            EndianArg::Little => Self::Little,
            EndianArg::Big => Self::Big,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let endian = Endian::from(cli.endian);

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create output dir {}", cli.out_dir.display()))?;
    write_schema_json(&cli.out_dir)?;

    let mut rng = Rng::new(cli.seed);
    let mut creatures = init_creatures(cli.creatures, &mut rng);
    let mut link = Link::new(endian);
    let mut summary = Summary::new(&cli);

    for tick in 1..=cli.ticks {
        step_creatures(&mut creatures, &mut rng, tick, cli.burst_every);
        link.server.add_snapshot(Tick::new(tick));
        for (idx, creature) in creatures.iter().enumerate() {
            link.server.observe(entity_id(idx), *creature);
        }

        let datagram = link.produce();
        write_capture(&cli.out_dir, &datagram)?;
        validate_capture(&datagram, endian)?;
        summary.push_packet(datagram.mode, datagram.payload.len() as u64);

        if rng.chance(cli.drop_percent) {
            summary.dropped += 1;
            debug!("packet {} lost", datagram.seq);
        } else {
            link.deliver(&datagram, &mut summary)?;
        }
        if rng.chance(cli.ack_loss_percent) {
            summary.acks_lost += 1;
        } else {
            link.acknowledge();
        }
    }

    // Lossless rounds until the client has caught up with the server.
    for _ in 0..3 {
        let datagram = link.produce();
        link.deliver(&datagram, &mut summary)?;
        link.acknowledge();
    }
    summary.converged = link.converged(creatures.len());
    if !summary.converged {
        anyhow::bail!("client state diverged from server after final sync");
    }

    summary.finalize();
    summary.assert_budgets(cli.max_p95_bytes, cli.max_avg_bytes)?;
    write_summary_json(&cli.out_dir, &summary)?;
    info!(
        "{} packets ({} full), avg {} bytes, p95 {} bytes, {} dropped, {} rejected",
        summary.full_count + summary.incremental_count,
        summary.full_count,
        summary.avg_incremental_bytes,
        summary.p95_incremental_bytes,
        summary.dropped,
        summary.rejected
    );

    Ok(())
}

/// One packet plus the acknowledgement the server diffed against.
///
/// The acknowledgement travels beside the payload; the payload is exactly
/// what `History::serialize` produced.
struct Datagram {
    seq: Seq,
    ack: Seq,
    mode: SyncMode,
    payload: Vec<u8>,
}

struct Link {
    server: History<CreatureStatus>,
    client: History<CreatureStatus>,
    server_ack: Seq,
}

impl Link {
    fn new(endian: Endian) -> Self {
        Self {
            server: History::new(server_config().with_endian(endian)),
            client: History::new(client_config().with_endian(endian)),
            server_ack: Seq::new(0),
        }
    }

    fn produce(&self) -> Datagram {
        let ack = self.server_ack;
        Datagram {
            seq: self.server.seq(),
            ack,
            mode: self.server.mode_for(ack),
            payload: self.server.serialize(ack).finish(),
        }
    }

    fn deliver(&mut self, datagram: &Datagram, summary: &mut Summary) -> Result<()> {
        let mut reader = ByteReader::new(&datagram.payload, self.client.config().endian);
        match self.client.deserialize(&mut reader, datagram.ack) {
            Ok(applied) => {
                summary.applied += 1;
                debug!(
                    "client applied {} ({} entities, advanced {})",
                    applied.seq, applied.entities, applied.advanced
                );
                Ok(())
            }
            Err(HistoryError::UnusablePacket { .. } | HistoryError::StalePacket { .. }) => {
                summary.rejected += 1;
                Ok(())
            }
            Err(err) => Err(err).with_context(|| format!("apply packet {}", datagram.seq)),
        }
    }

    /// The client acknowledges its newest sequence.
    fn acknowledge(&mut self) {
        self.server_ack = self.server_ack.max(self.client.seq());
    }

    fn converged(&self, creatures: usize) -> bool {
        (0..creatures).all(|idx| {
            let id = entity_id(idx);
            self.client.status(id) == self.server.status(id)
        })
    }
}

fn entity_id(idx: usize) -> EntityId {
    EntityId::new(u32::try_from(idx).unwrap_or(u32::MAX) + 1)
}

fn write_schema_json(out_dir: &Path) -> Result<()> {
    let path = out_dir.join("schema.json");
    let report = schema_report(&CreatureStatus::SCHEMA);
    let contents = serde_json::to_string_pretty(&report).context("serialize schema")?;
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn write_capture(out_dir: &Path, datagram: &Datagram) -> Result<()> {
    let kind = match datagram.mode {
        SyncMode::Full => "full",
        SyncMode::Incremental => "delta",
    };
    let path = out_dir.join(format!(
        "{kind}_{:06}_ack_{:06}.bin",
        datagram.seq.raw(),
        datagram.ack.raw()
    ));
    fs::write(&path, &datagram.payload).with_context(|| format!("write {}", path.display()))
}

fn write_summary_json(out_dir: &Path, summary: &Summary) -> Result<()> {
    let path = out_dir.join("summary.json");
    let contents = serde_json::to_string_pretty(summary).context("serialize summary")?;
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Decodes the capture with the inspection tooling and checks its header.
fn validate_capture(datagram: &Datagram, endian: Endian) -> Result<()> {
    let report = inspect_packet(&datagram.payload, &CreatureStatus::SCHEMA, endian)
        .with_context(|| format!("inspect packet {}", datagram.seq))?;
    if report.seq != datagram.seq.raw() {
        anyhow::bail!("packet header seq {} != {}", report.seq, datagram.seq);
    }
    if datagram.mode == SyncMode::Full && report.full_entries != report.entries.len() {
        anyhow::bail!("full packet {} carries partial entries", datagram.seq);
    }
    Ok(())
}

fn init_creatures(count: u32, rng: &mut Rng) -> Vec<CreatureStatus> {
    (0..count)
        .map(|_| CreatureStatus {
            x: rng.range_f32(-500.0, 500.0),
            y: rng.range_f32(-500.0, 500.0),
            z: 0.0,
            heading: f64::from(rng.next_u32() % 360),
            anim: 0,
            animframe: 0,
            faction: (rng.next_u32() % 4) as u8,
            equipment1: (rng.next_u32() % 200) as u16,
            equipment2: (rng.next_u32() % 200) as u16,
            equipment3: 0,
            equipment4: 0,
            equipment5: 0,
            equipment6: 0,
        })
        .collect()
}

fn step_creatures(creatures: &mut [CreatureStatus], rng: &mut Rng, tick: u32, burst: Option<u32>) {
    let burst_now = burst.is_some_and(|every| every > 0 && tick % every == 0);
    for creature in creatures {
        // Roughly half the creatures are walking on any tick.
        if rng.chance(50) {
            let radians = creature.heading.to_radians();
            creature.x += radians.cos() as f32;
            creature.y += radians.sin() as f32;
            creature.anim = 1;
            creature.animframe = creature.animframe.wrapping_add(1) % 24;
        } else if creature.anim != 0 {
            creature.anim = 0;
            creature.animframe = 0;
        }
        if rng.chance(10) {
            let turn = f64::from(rng.next_u32() % 61) - 30.0;
            creature.heading = (creature.heading + turn).rem_euclid(360.0);
        }
        if rng.chance(1) {
            creature.z = rng.range_f32(0.0, 3.0);
        }
        if burst_now {
            creature.equipment3 = creature.equipment3.wrapping_add(1);
            creature.equipment4 = (rng.next_u32() % 500) as u16;
        }
    }
}

struct Rng {
    state: u64,
}

impl Rng {
    const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn chance(&mut self, percent: u32) -> bool {
        self.next_u32() % 100 < percent
    }

    fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        let unit = (self.next_u32() % 10_000) as f32 / 10_000.0;
        min + (max - min) * unit
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    creatures: u32,
    ticks: u32,
    seed: u64,
    drop_percent: u32,
    ack_loss_percent: u32,
    burst_every: Option<u32>,
    endian: EndianArg,
    full_count: u32,
    incremental_count: u32,
    full_bytes_total: u64,
    incremental_bytes_total: u64,
    avg_bytes_per_tick: u64,
    avg_incremental_bytes: u64,
    p95_incremental_bytes: u64,
    dropped: u32,
    acks_lost: u32,
    applied: u32,
    rejected: u32,
    converged: bool,
    #[serde(skip)]
    incremental_sizes: Vec<u64>,
}

impl Summary {
    fn new(cli: &Cli) -> Self {
        Self {
            creatures: cli.creatures,
            ticks: cli.ticks,
            seed: cli.seed,
            drop_percent: cli.drop_percent,
            ack_loss_percent: cli.ack_loss_percent,
            burst_every: cli.burst_every,
            endian: cli.endian,
            full_count: 0,
            incremental_count: 0,
            full_bytes_total: 0,
            incremental_bytes_total: 0,
            avg_bytes_per_tick: 0,
            avg_incremental_bytes: 0,
            p95_incremental_bytes: 0,
            dropped: 0,
            acks_lost: 0,
            applied: 0,
            rejected: 0,
            converged: false,
            incremental_sizes: Vec::new(),
        }
    }

    fn push_packet(&mut self, mode: SyncMode, bytes: u64) {
        match mode {
            SyncMode::Full => {
                self.full_count += 1;
                self.full_bytes_total += bytes;
            }
            SyncMode::Incremental => {
                self.incremental_count += 1;
                self.incremental_bytes_total += bytes;
                self.incremental_sizes.push(bytes);
            }
        }
    }

    fn finalize(&mut self) {
        if self.ticks > 0 {
            self.avg_bytes_per_tick =
                (self.full_bytes_total + self.incremental_bytes_total) / u64::from(self.ticks);
        }
        if self.incremental_count > 0 {
            self.avg_incremental_bytes =
                self.incremental_bytes_total / u64::from(self.incremental_count);
            self.incremental_sizes.sort_unstable();
            let idx = ((self.incremental_sizes.len() as f64) * 0.95).ceil() as usize;
            let idx = idx.saturating_sub(1).min(self.incremental_sizes.len() - 1);
            self.p95_incremental_bytes = self.incremental_sizes[idx];
        }
    }

    fn assert_budgets(&self, max_p95: Option<u64>, max_avg: Option<u64>) -> Result<()> {
        if let Some(max_p95) = max_p95 {
            if self.p95_incremental_bytes > max_p95 {
                anyhow::bail!(
                    "p95 incremental bytes {} exceeds budget {}",
                    self.p95_incremental_bytes,
                    max_p95
                );
            }
        }
        if let Some(max_avg) = max_avg {
            if self.avg_incremental_bytes > max_avg {
                anyhow::bail!(
                    "avg incremental bytes {} exceeds budget {}",
                    self.avg_incremental_bytes,
                    max_avg
                );
            }
        }
        Ok(())
    }
}
