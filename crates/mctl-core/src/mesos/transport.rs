use std::{collections::VecDeque, io, pin::Pin, sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt};
use reqwest::{Client, Response, StatusCode, header, redirect::Policy};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_util::{codec::FramedRead, io::StreamReader};
use tracing::{debug, error, info, instrument, trace, warn};

use mctl_model::TaskDescriptor;

use super::{
    leader::{leader_from_location, resolve_leader},
    map::{task_status, to_task_info},
    recordio::RecordIo,
    wire::{
        Accept, Acknowledge, Call, CallBody, Decline, Event, EventKind, Filters, FrameworkInfo, Id,
        Kill, Launch, Offer, Operation, Status, Subscribe, TaskInfo,
    },
};
use crate::{
    config::FrameworkConfig,
    error::TransportError,
    transport::{EventStream, ManagerEvent, StatusUpdate, Transport},
};

const SCHEDULER_PATH: &str = "/api/v1/scheduler";
const STREAM_ID: &str = "Mesos-Stream-Id";

/// How long the manager withholds declined offers, in seconds.
pub const DEFAULT_REFUSE_SECONDS: f64 = 5.0;

/// Heartbeat interval assumed until SUBSCRIBED announces one. Mesos uses 15s.
pub const DEFAULT_HEARTBEAT_SECS: f64 = 15.0;

/// Heartbeats that may be missed before the stream counts as dead.
const MISSED_HEARTBEATS: f64 = 3.0;

/// Upper bound for one scheduler call. The SUBSCRIBE stream itself is unbounded.
const CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest silence tolerated on the event stream.
fn idle_limit(heartbeat_secs: Option<f64>) -> Duration {
    let secs = heartbeat_secs
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_HEARTBEAT_SECS);
    Duration::from_secs_f64(secs * MISSED_HEARTBEATS)
}

type Frames = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

#[derive(Clone, Debug)]
struct Session {
    endpoint: String,
    stream_id: String,
    framework_id: Id,
}

struct PendingLaunch {
    manager_id: String,
    task: TaskDescriptor,
    done: oneshot::Sender<Result<(), TransportError>>,
}

struct Inner {
    client: Client,
    master: String,
    refuse_seconds: f64,
    session: Mutex<Option<Session>>,
    launches: Mutex<VecDeque<PendingLaunch>>,
}

/// Mesos v1 scheduler HTTP API transport.
///
/// One SUBSCRIBE stream per registration. A background reader turns the stream into
/// [`ManagerEvent`]s and spends offers on queued launches.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<Inner>,
}

impl HttpTransport {
    /// `master` may be empty, in which case the leader is discovered on register.
    pub fn new(master: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder().redirect(Policy::none()).build()?;
        Ok(Self {
            inner: Arc::new(Inner {
                client,
                master: master.into(),
                refuse_seconds: DEFAULT_REFUSE_SECONDS,
                session: Mutex::new(None),
                launches: Mutex::new(VecDeque::new()),
            }),
        })
    }

    async fn subscribe(&self, endpoint: &str, call: &Call) -> Result<Response, TransportError> {
        Ok(self
            .inner
            .client
            .post(endpoint)
            .header(header::ACCEPT, "application/json")
            .json(call)
            .send()
            .await?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "mesos-http"
    }

    #[instrument(level = "debug", skip_all, fields(framework = %framework.name))]
    async fn register(&self, framework: &FrameworkConfig) -> Result<EventStream, TransportError> {
        let leader = resolve_leader(&self.inner.client, &self.inner.master).await?;
        let call = Call {
            framework_id: None,
            body: CallBody::Subscribe {
                subscribe: Subscribe {
                    framework_info: FrameworkInfo {
                        user: framework.user.clone(),
                        name: framework.name.clone(),
                        role: framework.role.clone(),
                        hostname: framework.hostname.clone(),
                        failover_timeout: framework.failover_timeout_secs,
                    },
                },
            },
        };

        let mut endpoint = format!("{leader}{SCHEDULER_PATH}");
        let mut resp = self.subscribe(&endpoint, &call).await?;

        // A non-leading master points at the leader once.
        if resp.status() == StatusCode::TEMPORARY_REDIRECT {
            let location = resp
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| TransportError::Http("subscribe redirect without location".into()))?;
            let leader = leader_from_location(&leader, location)?;
            debug!(%leader, "subscribe redirected");
            endpoint = format!("{leader}{SCHEDULER_PATH}");
            resp = self.subscribe(&endpoint, &call).await?;
        }

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Rejected(format!(
                "SUBSCRIBE answered {status}: {}",
                body.trim()
            )));
        }

        let stream_id = resp
            .headers()
            .get(STREAM_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| TransportError::Http(format!("response carries no {STREAM_ID}")))?;

        let body = resp.bytes_stream().map_err(io::Error::other);
        let mut frames: Frames =
            Box::pin(FramedRead::new(StreamReader::new(body), RecordIo::default()));

        let handshake = idle_limit(None);
        let subscribed = loop {
            let event = tokio::time::timeout(handshake, next_event(&mut frames))
                .await
                .map_err(|_| {
                    TransportError::Disconnected(format!("no SUBSCRIBED within {handshake:?}"))
                })??
                .ok_or_else(|| TransportError::Disconnected("stream ended before SUBSCRIBED".into()))?;
            match event.kind {
                EventKind::Subscribed => {
                    break event
                        .subscribed
                        .ok_or_else(|| TransportError::Codec("SUBSCRIBED without body".into()))?;
                }
                EventKind::Error => {
                    let msg = event.error.map(|e| e.message).unwrap_or_default();
                    return Err(TransportError::Manager(msg));
                }
                other => trace!(?other, "event before SUBSCRIBED"),
            }
        };

        let idle = idle_limit(subscribed.heartbeat_interval_seconds);
        info!(framework_id = %subscribed.framework_id.value, %endpoint, ?idle, "framework registered");
        *self.inner.session.lock().await = Some(Session {
            endpoint,
            stream_id,
            framework_id: subscribed.framework_id,
        });

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(Arc::clone(&self.inner), frames, idle, tx));
        Ok(rx)
    }

    #[instrument(level = "debug", skip(self, task), fields(task = %task.id))]
    async fn submit(&self, manager_id: &str, task: &TaskDescriptor) -> Result<(), TransportError> {
        if self.inner.session.lock().await.is_none() {
            return Err(TransportError::NotRegistered);
        }

        let (done, accepted) = oneshot::channel();
        self.inner.launches.lock().await.push_back(PendingLaunch {
            manager_id: manager_id.to_string(),
            task: task.clone(),
            done,
        });
        self.inner.call(CallBody::Revive).await?;

        accepted
            .await
            .map_err(|_| TransportError::Disconnected("launch abandoned".into()))?
    }

    async fn acknowledge(&self, update: &StatusUpdate) -> Result<(), TransportError> {
        let (Some(uuid), Some(agent_id)) = (&update.ack, &update.agent_id) else {
            return Ok(());
        };
        self.inner
            .call(CallBody::Acknowledge {
                acknowledge: Acknowledge {
                    agent_id: Id::new(agent_id.as_str()),
                    task_id: Id::new(update.manager_id.as_str()),
                    uuid: uuid.clone(),
                },
            })
            .await
    }

    async fn kill(&self, manager_id: &str, agent_id: Option<&str>) -> Result<(), TransportError> {
        self.inner
            .call(CallBody::Kill {
                kill: Kill {
                    task_id: Id::new(manager_id),
                    agent_id: agent_id.map(Id::new),
                },
            })
            .await
    }

    async fn teardown(&self) -> Result<(), TransportError> {
        // Nothing queued may launch once the driver has given up on it.
        self.inner.fail_pending("framework torn down").await;
        self.inner.call(CallBody::Teardown).await?;
        *self.inner.session.lock().await = None;
        Ok(())
    }
}

impl Inner {
    async fn call(&self, body: CallBody) -> Result<(), TransportError> {
        let session = self
            .session
            .lock()
            .await
            .clone()
            .ok_or(TransportError::NotRegistered)?;
        let kind = body.kind();
        let call = Call {
            framework_id: Some(session.framework_id),
            body,
        };

        trace!(kind, "scheduler call");
        let resp = self
            .client
            .post(&session.endpoint)
            .timeout(CALL_TIMEOUT)
            .header(STREAM_ID, session.stream_id)
            .json(&call)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(TransportError::Rejected(format!(
            "{kind} answered {status}: {}",
            body.trim()
        )))
    }

    /// Spend the first offer on every queued launch and decline the rest.
    async fn on_offers(&self, offers: Vec<Offer>) {
        let queued: Vec<PendingLaunch> = self.launches.lock().await.drain(..).collect();
        let OfferPlan {
            accept,
            decline,
            rejected,
            requeue,
        } = plan_offers(queued, offers);

        if !requeue.is_empty() {
            let mut launches = self.launches.lock().await;
            for launch in requeue.into_iter().rev() {
                launches.push_front(launch);
            }
        }
        for (launch, e) in rejected {
            warn!(manager_id = %launch.manager_id, error = %e, "launch cannot be mapped");
            let _ = launch.done.send(Err(e));
        }

        if let Some(Accepted {
            offer,
            task_infos,
            launches,
        }) = accept
        {
            debug!(offer = %offer.id.value, agent = %offer.agent_id.value, hostname = %offer.hostname, launches = task_infos.len(), "accepting offer");
            let result = self
                .call(CallBody::Accept {
                    accept: Accept {
                        offer_ids: vec![offer.id],
                        operations: vec![Operation::Launch {
                            launch: Launch { task_infos },
                        }],
                        filters: Filters {
                            refuse_seconds: self.refuse_seconds,
                        },
                    },
                })
                .await;
            for launch in launches {
                let _ = launch.done.send(result.clone());
            }
        }

        if decline.is_empty() {
            return;
        }
        trace!(count = decline.len(), "declining offers");
        if let Err(e) = self
            .call(CallBody::Decline {
                decline: Decline {
                    offer_ids: decline,
                    filters: Filters {
                        refuse_seconds: self.refuse_seconds,
                    },
                },
            })
            .await
        {
            warn!(error = %e, "decline failed");
        }
    }

    async fn fail_pending(&self, reason: &str) {
        for launch in self.launches.lock().await.drain(..) {
            let _ = launch
                .done
                .send(Err(TransportError::Disconnected(reason.to_string())));
        }
    }
}

/// The offer taken for launching, with what goes into its LAUNCH.
struct Accepted {
    offer: Offer,
    task_infos: Vec<TaskInfo>,
    launches: Vec<PendingLaunch>,
}

/// Outcome of matching one OFFERS event against the launch queue.
#[derive(Default)]
struct OfferPlan {
    accept: Option<Accepted>,
    decline: Vec<Id>,
    /// Launches whose descriptor does not map onto a task.
    rejected: Vec<(PendingLaunch, TransportError)>,
    /// Launches still waiting, because the event carried no offer.
    requeue: Vec<PendingLaunch>,
}

/// Offers are taken as they come: resources are not matched against the launches.
/// Launches whose submitter has gone away are dropped.
fn plan_offers(queued: Vec<PendingLaunch>, offers: Vec<Offer>) -> OfferPlan {
    let mut plan = OfferPlan::default();
    let mut offers = offers.into_iter();
    let queued: Vec<PendingLaunch> = queued
        .into_iter()
        .filter(|launch| !launch.done.is_closed())
        .collect();

    if !queued.is_empty() {
        match offers.next() {
            None => plan.requeue = queued,
            Some(offer) => {
                let mut task_infos = Vec::new();
                let mut launches = Vec::new();
                for launch in queued {
                    match to_task_info(&launch.manager_id, &offer.agent_id.value, &launch.task) {
                        Ok(info) => {
                            task_infos.push(info);
                            launches.push(launch);
                        }
                        Err(e) => plan
                            .rejected
                            .push((launch, TransportError::Rejected(e.to_string()))),
                    }
                }
                if launches.is_empty() {
                    plan.decline.push(offer.id);
                } else {
                    plan.accept = Some(Accepted {
                        offer,
                        task_infos,
                        launches,
                    });
                }
            }
        }
    }

    plan.decline.extend(offers.map(|offer| offer.id));
    plan
}

async fn next_event(frames: &mut Frames) -> Result<Option<Event>, TransportError> {
    while let Some(frame) = frames.next().await {
        let frame = frame?;
        if frame.is_empty() {
            continue;
        }
        trace!(len = frame.len(), "event frame");
        return serde_json::from_slice(&frame)
            .map(Some)
            .map_err(|e| TransportError::Codec(e.to_string()));
    }
    Ok(None)
}

fn status_update(status: Status) -> StatusUpdate {
    StatusUpdate {
        status: task_status(&status.state),
        manager_id: status.task_id.value,
        message: status.message.or(status.reason),
        timestamp: status.timestamp,
        agent_id: status.agent_id.map(|a| a.value),
        ack: status.uuid,
    }
}

/// Reads the event stream until it ends, falls silent for `idle`, or the receiver goes away.
async fn pump(
    inner: Arc<Inner>,
    mut frames: Frames,
    idle: Duration,
    tx: mpsc::UnboundedSender<ManagerEvent>,
) {
    let closing = loop {
        let event = match tokio::time::timeout(idle, next_event(&mut frames)).await {
            Ok(Ok(Some(event))) => event,
            Ok(Ok(None)) => break ManagerEvent::Disconnected("event stream ended".into()),
            Ok(Err(e)) => break ManagerEvent::Disconnected(e.to_string()),
            Err(_) => {
                warn!(?idle, "no event or heartbeat from the manager");
                break ManagerEvent::Disconnected(format!("manager silent for {idle:?}"));
            }
        };

        match event.kind {
            EventKind::Offers => {
                let offers = event.offers.map(|o| o.offers).unwrap_or_default();
                inner.on_offers(offers).await;
            }
            EventKind::Update => {
                let Some(update) = event.update else { continue };
                if tx.send(ManagerEvent::Update(status_update(update.status))).is_err() {
                    break ManagerEvent::Disconnected("receiver dropped".into());
                }
            }
            EventKind::Error => {
                let msg = event.error.map(|e| e.message).unwrap_or_default();
                error!(error = %msg, "manager terminated the session");
                break ManagerEvent::Error(msg);
            }
            EventKind::Failure => {
                if let Some(f) = event.failure {
                    warn!(agent = ?f.agent_id.map(|a| a.value), status = ?f.status, "agent or executor failure");
                }
            }
            EventKind::Rescind => {
                if let Some(r) = event.rescind {
                    debug!(offer = %r.offer_id.value, "offer rescinded");
                }
            }
            EventKind::Heartbeat => trace!("heartbeat"),
            other => trace!(?other, "event ignored"),
        }
    };

    inner.fail_pending("event stream closed").await;
    let _ = tx.send(closing);
}
