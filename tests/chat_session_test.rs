//! ReqChat 集成测试
//!
//! 通过内存传输层驱动高层会话 API。

#[cfg(feature = "client")]
mod chat_session_tests {
    use reqchat::{ChatSession, Error};
    use reqchat_client::{ClientEvent, InboundEvent, MemoryConnector, MemoryPeer};
    use reqchat_config::ChatConfig;

    fn chunk(content: &str) -> InboundEvent {
        InboundEvent::Chunk {
            content: content.to_string(),
            timestamp: "t".to_string(),
        }
    }

    async fn open(connector: &MemoryConnector) -> (ChatSession<MemoryConnector>, MemoryPeer) {
        let mut session = ChatSession::open_with_connector(
            ChatConfig::new("http://localhost:8000"),
            "s-1",
            "tok",
            connector.clone(),
        )
        .unwrap();
        let peer = connector.accept().await.unwrap();
        session.wait_connected().await.unwrap();
        (session, peer)
    }

    #[tokio::test]
    async fn test_ask_returns_reassembled_reply() {
        let connector = MemoryConnector::new();
        let (mut session, mut peer) = open(&connector).await;

        let server = tokio::spawn(async move {
            let frame = peer.recv().await.unwrap();
            assert_eq!(frame, r#"{"type":"message","content":"Users log in"}"#);
            peer.send_event(&chunk("Which "));
            peer.send_event(&chunk("identity provider?"));
            peer.send_text(r#"{"type":"complete","timestamp":"t"}"#);
            peer
        });

        let reply = session.ask("Users log in").await.unwrap();
        assert_eq!(reply, "Which identity provider?");
        assert_eq!(session.client().message_buffer(), "");
        let _peer = server.await.unwrap();
    }

    #[tokio::test]
    async fn test_ask_surfaces_server_error() {
        let connector = MemoryConnector::new();
        let (mut session, mut peer) = open(&connector).await;

        let server = tokio::spawn(async move {
            peer.recv().await.unwrap();
            peer.send_text(
                r#"{"type":"error","content":"Failed to generate response","timestamp":"t"}"#,
            );
            peer
        });

        let result = session.ask("anything").await;
        assert!(matches!(result, Err(Error::Reply(msg)) if msg == "Failed to generate response"));
        let _peer = server.await.unwrap();
    }

    #[tokio::test]
    async fn test_ask_ignores_text_from_failed_reply() {
        let connector = MemoryConnector::new();
        let (mut session, mut peer) = open(&connector).await;

        let server = tokio::spawn(async move {
            peer.recv().await.unwrap();
            peer.send_event(&chunk("Partial "));
            peer.send_text(
                r#"{"type":"error","content":"Failed to generate response: boom","timestamp":"t"}"#,
            );
            peer.recv().await.unwrap();
            peer.send_event(&chunk("Fresh reply"));
            peer.send_text(r#"{"type":"complete","timestamp":"t"}"#);
            peer
        });

        let first = session.ask("first").await;
        assert!(matches!(first, Err(Error::Reply(_))));

        let second = session.ask("second").await.unwrap();
        assert_eq!(second, "Fresh reply");
        let _peer = server.await.unwrap();
    }

    #[tokio::test]
    async fn test_ask_fails_when_not_connected() {
        let connector = MemoryConnector::new();
        let (mut session, peer) = open(&connector).await;

        session.client().disconnect();
        let result = session.ask("hello?").await;
        assert!(matches!(result, Err(Error::Client(_))));
        drop(peer);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_connected_gives_up_after_retries() {
        let connector = MemoryConnector::new();
        connector.refuse_next(usize::MAX);

        let mut session = ChatSession::open_with_connector(
            ChatConfig::new("http://localhost:8000").with_max_reconnect_attempts(2),
            "s-1",
            "tok",
            connector.clone(),
        )
        .unwrap();

        let result = session.wait_connected().await;
        assert!(matches!(result, Err(Error::SessionClosed)));
        assert_eq!(connector.attempts(), 3);
    }

    #[tokio::test]
    async fn test_new_chat_and_raw_events() {
        let connector = MemoryConnector::new();
        let (mut session, mut peer) = open(&connector).await;

        assert!(session.new_chat(None));
        assert_eq!(peer.recv().await.as_deref(), Some(r#"{"type":"new_chat"}"#));

        peer.send_text(r#"{"type":"chat_cleared","timestamp":"t"}"#);
        match session.next_event().await {
            Some(ClientEvent::Message { event, .. }) => assert_eq!(event.kind(), "chat_cleared"),
            other => panic!("unexpected event: {:?}", other),
        }

        session.close();
        assert!(peer.recv().await.is_none());
    }
}
