use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, trace, warn};

use crate::descriptor::MessageDescriptor;
use crate::dispatch::{DispatchTarget, Envelope};
use crate::error::{Result, RouterError};
use crate::mask::ProtocolMask;
use crate::message::{message_id, McuMessage, MessageId};
use crate::processor::Processor;

/// Message table under construction.
///
/// `M` is the typed message handed to handlers (usually an enum with one
/// variant per kind) and `C` the per-frame context forwarded with it.
pub struct RouterBuilder<M, C> {
    descriptors: Vec<MessageDescriptor<M, C>>,
    index: HashMap<MessageId, usize>,
}

impl<M, C> Default for RouterBuilder<M, C> {
    fn default() -> Self {
        Self {
            descriptors: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<M, C> RouterBuilder<M, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a message kind under `kind` with its alternative masks.
    ///
    /// `build` wraps a matched frame into the typed message.
    pub fn register<I, F>(&mut self, kind: &str, masks: I, build: F) -> Result<MessageId>
    where
        I: IntoIterator,
        I::Item: Into<ProtocolMask>,
        F: Fn(Bytes) -> M + Send + Sync + 'static,
    {
        if kind.is_empty() {
            return Err(RouterError::UnnamedMessage);
        }
        if let Some(existing) = self.index.get_key_value(kind) {
            return Err(RouterError::DuplicateMessage(existing.0.clone()));
        }

        let id = MessageId::from(kind);
        let masks: Vec<ProtocolMask> = masks.into_iter().map(Into::into).collect();
        if masks.is_empty() {
            warn!(%id, "message registered without masks; it will never match");
        }
        debug!(%id, masks = masks.len(), "registered message");

        self.index.insert(id.clone(), self.descriptors.len());
        self.descriptors.push(MessageDescriptor {
            id: id.clone(),
            masks,
            build: Arc::new(build),
            target: None,
        });
        Ok(id)
    }

    /// Register `T` under an id derived from its type name.
    pub fn register_message<T, I>(&mut self, masks: I) -> Result<MessageId>
    where
        T: McuMessage + 'static,
        M: From<T> + 'static,
        I: IntoIterator,
        I::Item: Into<ProtocolMask>,
    {
        self.register(message_id::<T>(), masks, build_message::<T, M>)
    }

    /// Attach the dispatch target for an already registered id.
    ///
    /// Binding again replaces the previous target.
    pub fn bind_router<D>(&mut self, id: &str, target: D) -> Result<()>
    where
        D: DispatchTarget<M, C> + 'static,
    {
        let slot = *self
            .index
            .get(id)
            .ok_or_else(|| RouterError::NotRegistered(id.to_string()))?;
        let descriptor = &mut self.descriptors[slot];
        if descriptor.target.is_some() {
            debug!(%id, "replacing dispatch target");
        }
        descriptor.target = Some(Arc::new(target));
        Ok(())
    }

    /// Attach the dispatch target for `T`, registered with [`Self::register_message`].
    pub fn bind_message<T, D>(&mut self, target: D) -> Result<()>
    where
        D: DispatchTarget<M, C> + 'static,
    {
        self.bind_router(message_id::<T>(), target)
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Freeze the table. No registration is possible afterwards.
    pub fn build(self) -> MaskRouter<M, C> {
        for descriptor in &self.descriptors {
            if !descriptor.is_bound() {
                warn!(id = %descriptor.id, "message has no dispatch target; matches will be dropped");
            }
        }
        info!(messages = self.descriptors.len(), "mask router ready");
        MaskRouter {
            descriptors: self.descriptors,
        }
    }
}

impl<M, C> std::fmt::Debug for RouterBuilder<M, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("descriptors", &self.descriptors)
            .finish()
    }
}

fn build_message<T: McuMessage, M: From<T>>(frame: Bytes) -> M {
    M::from(T::from_frame(frame))
}

/// Immutable message table that classifies and dispatches frames.
///
/// Safe to share between connection threads behind an `Arc`.
pub struct MaskRouter<M, C> {
    descriptors: Vec<MessageDescriptor<M, C>>,
}

impl<M, C: Clone> MaskRouter<M, C> {
    /// Dispatch `frame` to every descriptor with a matching mask.
    ///
    /// Each matching mask produces one envelope, so a descriptor with two
    /// matching masks is dispatched twice. Targets are never waited on; an
    /// unbound descriptor or a target that refuses the envelope drops the
    /// match. Returns the number of envelopes enqueued.
    pub fn route(&self, frame: impl Into<Bytes>, context: C) -> Result<usize> {
        let frame: Bytes = frame.into();
        if frame.is_empty() {
            return Err(RouterError::InvalidInput);
        }

        let mut dispatched = 0usize;
        for descriptor in &self.descriptors {
            for _mask in descriptor.matching_masks(&frame) {
                let Some(target) = &descriptor.target else {
                    trace!(id = %descriptor.id, "no dispatch target for matched message");
                    continue;
                };

                let envelope = Envelope {
                    id: descriptor.id.clone(),
                    message: descriptor.build(frame.clone()),
                    context: context.clone(),
                };
                match target.dispatch(envelope) {
                    Ok(()) => dispatched += 1,
                    Err(err) => {
                        warn!(id = %descriptor.id, error = %err, "dropping routed message")
                    }
                }
            }
        }

        trace!(len = frame.len(), dispatched, "frame routed");
        Ok(dispatched)
    }
}

impl<M, C> MaskRouter<M, C> {
    /// Ids of the descriptors with at least one mask matching `frame`.
    pub fn matches(&self, frame: &[u8]) -> Vec<MessageId> {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.matching_masks(frame).next().is_some())
            .map(|descriptor| descriptor.id.clone())
            .collect()
    }

    /// Look up a descriptor by id.
    pub fn descriptor(&self, id: &str) -> Option<&MessageDescriptor<M, C>> {
        self.descriptors.iter().find(|descriptor| descriptor.id == id)
    }

    /// Registered descriptors, in registration order.
    pub fn descriptors(&self) -> &[MessageDescriptor<M, C>] {
        &self.descriptors
    }

    /// Wire bytes are handed to handlers untouched.
    pub fn unmarshal(&self, data: Bytes) -> Result<Bytes> {
        Ok(data)
    }

    /// Outgoing messages are already wire bytes; wrap them as a single part.
    pub fn marshal(&self, message: Bytes) -> Result<Vec<Bytes>> {
        if message.is_empty() {
            return Err(RouterError::InvalidInput);
        }
        Ok(vec![message])
    }
}

impl<M, C: Clone> Processor for MaskRouter<M, C> {
    type Context = C;

    fn route(&self, frame: Bytes, context: C) -> Result<usize> {
        MaskRouter::route(self, frame, context)
    }

    fn unmarshal(&self, data: Bytes) -> Result<Bytes> {
        MaskRouter::unmarshal(self, data)
    }

    fn marshal(&self, message: Bytes) -> Result<Vec<Bytes>> {
        MaskRouter::marshal(self, message)
    }
}

impl<M, C> std::fmt::Debug for MaskRouter<M, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskRouter")
            .field("descriptors", &self.descriptors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Msg {
        Heartbeat(Bytes),
        Reading(Bytes),
    }

    struct Heartbeat {
        data: Bytes,
    }

    impl McuMessage for Heartbeat {
        fn from_frame(data: Bytes) -> Self {
            Self { data }
        }
    }

    impl From<Heartbeat> for Msg {
        fn from(msg: Heartbeat) -> Self {
            Msg::Heartbeat(msg.data)
        }
    }

    mod duplicate {
        pub struct Heartbeat;

        impl crate::message::McuMessage for Heartbeat {
            fn from_frame(_data: bytes::Bytes) -> Self {
                Self
            }
        }

        impl From<Heartbeat> for super::Msg {
            fn from(_msg: Heartbeat) -> Self {
                super::Msg::Heartbeat(bytes::Bytes::new())
            }
        }
    }

    type Inbox = mpsc::Receiver<Envelope<Msg, u32>>;

    fn scenario_router() -> (MaskRouter<Msg, u32>, Inbox) {
        let (tx, rx) = mpsc::channel();
        let mut builder = RouterBuilder::<Msg, u32>::new();
        builder
            .register_message::<Heartbeat, _>([[0x00u8, 0x00, 0xAA]])
            .unwrap();
        builder.bind_message::<Heartbeat, _>(tx).unwrap();
        (builder.build(), rx)
    }

    #[test]
    fn scenario_frame_dispatches_typed_message() {
        let (router, rx) = scenario_router();
        let frame = Bytes::from_static(&[0x00, 0x03, 0xAA, 0xBB, 0xCC]);

        assert_eq!(router.route(frame.clone(), 42).unwrap(), 1);

        let envelope = rx.try_recv().unwrap();
        assert_eq!(envelope.id, "Heartbeat");
        assert_eq!(envelope.message, Msg::Heartbeat(frame));
        assert_eq!(envelope.context, 42);
    }

    #[test]
    fn non_matching_frame_dispatches_nothing() {
        let (router, rx) = scenario_router();

        assert_eq!(router.route(vec![0x00u8, 0x03, 0xAB, 0xBB], 1).unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn wildcard_mask_selects_second_byte() {
        let (tx, rx) = mpsc::channel::<Envelope<Msg, ()>>();
        let mut builder = RouterBuilder::<Msg, ()>::new();
        builder
            .register("Reading", [[0x00u8, 0x02]], Msg::Reading)
            .unwrap();
        builder.bind_router("Reading", tx).unwrap();
        let router = builder.build();

        assert_eq!(router.route(vec![0x01u8, 0x02, 0x07], ()).unwrap(), 1);
        assert_eq!(router.route(vec![0x99u8, 0x02, 0x07], ()).unwrap(), 1);
        assert_eq!(router.route(vec![0x01u8, 0x03, 0x07], ()).unwrap(), 0);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn multicast_to_every_matching_descriptor() {
        let (hb_tx, hb_rx) = mpsc::channel::<Envelope<Msg, &'static str>>();
        let (rd_tx, rd_rx) = mpsc::channel::<Envelope<Msg, &'static str>>();
        let mut builder = RouterBuilder::<Msg, &'static str>::new();
        builder
            .register("Heartbeat", [vec![0x68u8]], Msg::Heartbeat)
            .unwrap();
        builder
            .register("Reading", [vec![0x00u8, 0x10]], Msg::Reading)
            .unwrap();
        builder.bind_router("Heartbeat", hb_tx).unwrap();
        builder.bind_router("Reading", rd_tx).unwrap();
        let router = builder.build();

        assert_eq!(router.route(vec![0x68u8, 0x10, 0x01], "conn-1").unwrap(), 2);

        let hb = hb_rx.try_recv().unwrap();
        let rd = rd_rx.try_recv().unwrap();
        assert_eq!(hb.context, "conn-1");
        assert!(matches!(hb.message, Msg::Heartbeat(_)));
        assert!(matches!(rd.message, Msg::Reading(_)));
    }

    #[test]
    fn each_matching_mask_dispatches() {
        let (tx, rx) = mpsc::channel::<Envelope<Msg, ()>>();
        let mut builder = RouterBuilder::<Msg, ()>::new();
        builder
            .register(
                "Reading",
                [vec![0x68u8, 0x00], vec![0x00, 0x10], vec![0x69]],
                Msg::Reading,
            )
            .unwrap();
        builder.bind_router("Reading", tx).unwrap();
        let router = builder.build();

        assert_eq!(router.route(vec![0x68u8, 0x10], ()).unwrap(), 2);
        assert_eq!(rx.try_iter().count(), 2);
        assert_eq!(router.matches(&[0x68, 0x10]).len(), 1);
    }

    #[test]
    fn unbound_descriptor_is_silently_dropped() {
        let mut builder = RouterBuilder::<Msg, ()>::new();
        builder
            .register("Reading", [[0x01u8]], Msg::Reading)
            .unwrap();
        let router = builder.build();

        assert_eq!(router.route(vec![0x01u8], ()).unwrap(), 0);
        assert_eq!(router.matches(&[0x01]), vec![MessageId::from("Reading")]);
    }

    #[test]
    fn disconnected_target_does_not_fail_route() {
        let (tx, rx) = mpsc::channel::<Envelope<Msg, ()>>();
        drop(rx);
        let (ok_tx, ok_rx) = mpsc::channel::<Envelope<Msg, ()>>();
        let mut builder = RouterBuilder::<Msg, ()>::new();
        builder.register("Heartbeat", [[0x01u8]], Msg::Heartbeat).unwrap();
        builder.register("Reading", [[0x01u8]], Msg::Reading).unwrap();
        builder.bind_router("Heartbeat", tx).unwrap();
        builder.bind_router("Reading", ok_tx).unwrap();
        let router = builder.build();

        assert_eq!(router.route(vec![0x01u8], ()).unwrap(), 1);
        assert!(ok_rx.try_recv().is_ok());
    }

    #[test]
    fn full_target_drops_envelope() {
        let (tx, rx) = mpsc::sync_channel::<Envelope<Msg, ()>>(1);
        let mut builder = RouterBuilder::<Msg, ()>::new();
        builder.register("Reading", [[0x01u8]], Msg::Reading).unwrap();
        builder.bind_router("Reading", tx).unwrap();
        let router = builder.build();

        assert_eq!(router.route(vec![0x01u8], ()).unwrap(), 1);
        assert_eq!(router.route(vec![0x01u8], ()).unwrap(), 0);
        assert_eq!(rx.try_iter().count(), 1);
        assert_eq!(router.route(vec![0x01u8], ()).unwrap(), 1);
    }

    #[test]
    fn rebinding_replaces_target() {
        let (old_tx, old_rx) = mpsc::channel::<Envelope<Msg, ()>>();
        let (new_tx, new_rx) = mpsc::channel::<Envelope<Msg, ()>>();
        let mut builder = RouterBuilder::<Msg, ()>::new();
        builder.register("Reading", [[0x01u8]], Msg::Reading).unwrap();
        builder.bind_router("Reading", old_tx).unwrap();
        builder.bind_router("Reading", new_tx).unwrap();
        let router = builder.build();

        router.route(vec![0x01u8], ()).unwrap();
        assert!(old_rx.try_recv().is_err());
        assert!(new_rx.try_recv().is_ok());
    }

    #[test]
    fn builder_and_router_debug_list_descriptors() {
        let mut builder = RouterBuilder::<Msg, ()>::new();
        builder.register("Reading", [[0x01u8]], Msg::Reading).unwrap();

        let text = format!("{builder:?}");
        assert!(text.starts_with("RouterBuilder"));
        assert!(text.contains("Reading"));
        assert!(text.contains("bound: false"));

        let text = format!("{:?}", builder.build());
        assert!(text.starts_with("MaskRouter"));
    }

    #[test]
    fn empty_frame_is_rejected_without_dispatch() {
        let (router, rx) = scenario_router();
        assert!(matches!(
            router.route(Bytes::new(), 0),
            Err(RouterError::InvalidInput)
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut builder = RouterBuilder::<Msg, ()>::new();
        builder
            .register_message::<Heartbeat, _>([[0x01u8]])
            .unwrap();

        let err = builder
            .register_message::<Heartbeat, _>([[0x02u8]])
            .unwrap_err();
        assert!(matches!(err, RouterError::DuplicateMessage(ref id) if id == "Heartbeat"));

        let err = builder
            .register_message::<duplicate::Heartbeat, _>([[0x03u8]])
            .unwrap_err();
        assert!(matches!(err, RouterError::DuplicateMessage(_)));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn unnamed_registration_rejected() {
        let mut builder = RouterBuilder::<Msg, ()>::new();
        let err = builder.register("", [[0x01u8]], Msg::Reading).unwrap_err();
        assert!(matches!(err, RouterError::UnnamedMessage));
        assert!(builder.is_empty());
    }

    #[test]
    fn binding_unregistered_id_rejected() {
        let (tx, _rx) = mpsc::channel::<Envelope<Msg, ()>>();
        let mut builder = RouterBuilder::<Msg, ()>::new();
        let err = builder.bind_router("Ghost", tx).unwrap_err();
        assert!(matches!(err, RouterError::NotRegistered(ref id) if id == "Ghost"));
    }

    #[test]
    fn identity_marshal_and_unmarshal() {
        let (router, _rx) = scenario_router();
        let data = Bytes::from_static(b"\x00\x01z");

        assert_eq!(router.unmarshal(data.clone()).unwrap(), data);
        assert_eq!(router.marshal(data.clone()).unwrap(), vec![data]);
        assert!(matches!(
            router.marshal(Bytes::new()),
            Err(RouterError::InvalidInput)
        ));
    }

    #[test]
    fn router_is_shareable_across_threads() {
        let (tx, rx) = mpsc::channel::<Envelope<Msg, usize>>();
        let mut builder = RouterBuilder::<Msg, usize>::new();
        builder.register("Reading", [[0x10u8]], Msg::Reading).unwrap();
        builder.bind_router("Reading", tx).unwrap();
        let router = Arc::new(builder.build());

        let workers: Vec<_> = (0..4)
            .map(|conn| {
                let router = Arc::clone(&router);
                std::thread::spawn(move || {
                    for _ in 0..8 {
                        router.route(vec![0x10u8, conn as u8], conn).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(rx.try_iter().count(), 32);
    }

    #[test]
    fn processor_trait_delegates() {
        fn route_via<P: Processor<Context = u32>>(p: &P, frame: Bytes) -> usize {
            p.route(frame, 7).unwrap()
        }

        let (router, rx) = scenario_router();
        assert_eq!(
            route_via(&router, Bytes::from_static(&[0x01, 0x02, 0xAA])),
            1
        );
        assert_eq!(rx.try_recv().unwrap().context, 7);
    }
}
