// End-to-end integration tests for the multiplayer pipeline.
//
// Each test starts a real server, connects real GameClient instances (via
// TestPlayer), and verifies the full path: create room -> join -> placement
// -> battle -> game over, plus the rejection and disconnect paths.
//
// These tests exercise the same code paths as a live game; the only
// test-specific code is the blocking poll wrappers in TestPlayer.

use std::thread;
use std::time::Duration;

use broadside_protocol::message::ServerMessage;
use broadside_protocol::types::{Cell, Seat};
use broadside_server::server::{ServerConfig, ServerHandle, start_server};
use multiplayer_tests::TestPlayer;

/// Default manifest: [5, 4, 3, 3, 2] on a 7x9 board.
const SHIP_SIZES: [u8; 5] = [5, 4, 3, 3, 2];

/// Start a server on a random port, connect a creator and a joiner, and
/// wait until both have seen GameStart.
fn start_match() -> (ServerHandle, TestPlayer, TestPlayer) {
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };
    let (handle, addr) = start_server(config).unwrap();
    thread::sleep(Duration::from_millis(50));

    let mut alice = TestPlayer::create(addr, "Alice");
    let mut bob = TestPlayer::join(addr, alice.room_code(), "Bob");
    assert_eq!(alice.seat(), Seat::One);
    assert_eq!(bob.seat(), Seat::Two);

    alice.wait_for("GameStart", |m| {
        matches!(m, ServerMessage::GameStart { first_seat: Seat::One })
    });
    bob.wait_for("GameStart", |m| {
        matches!(m, ServerMessage::GameStart { first_seat: Seat::One })
    });
    (handle, alice, bob)
}

/// Place the full manifest for `player`: one ship per row, horizontal,
/// starting at column 0. Waits for the server's confirmation of each ship.
fn place_fleet(player: &mut TestPlayer) {
    let seat = player.seat();
    for (i, _size) in SHIP_SIZES.iter().enumerate() {
        let row = i as u8;
        player.send_move(row, 0, Some(true));
        if i + 1 < SHIP_SIZES.len() {
            let msg = player.wait_for("ShipPlaced", |m| {
                matches!(m, ServerMessage::ShipPlaced { seat: s, .. } if *s == seat)
            });
            match msg {
                ServerMessage::ShipPlaced { next_ship_size, .. } => {
                    assert_eq!(next_ship_size, SHIP_SIZES[i + 1]);
                }
                _ => unreachable!(),
            }
        }
    }
}

#[test]
fn full_game_to_victory() {
    let (handle, mut alice, mut bob) = start_match();

    // Placement: Alice first, manifest order, turn flips only at the end.
    place_fleet(&mut alice);
    let msg = alice.wait_for("PlacementComplete", |m| {
        matches!(m, ServerMessage::PlacementComplete { .. })
    });
    assert!(matches!(
        msg,
        ServerMessage::PlacementComplete {
            seat: Seat::One,
            next_seat: Seat::Two,
        }
    ));

    place_fleet(&mut bob);
    alice.wait_for("BattleStart", |m| {
        matches!(m, ServerMessage::BattleStart { first_seat: Seat::One })
    });
    bob.wait_for("BattleStart", |m| {
        matches!(m, ServerMessage::BattleStart { first_seat: Seat::One })
    });

    // Alice misses on an empty row: turn flips to Bob.
    alice.send_move(6, 0, None);
    let msg = alice.wait_for("ShotFired", |m| matches!(m, ServerMessage::ShotFired { .. }));
    match msg {
        ServerMessage::ShotFired {
            hit,
            game_over,
            next_seat,
            ..
        } => {
            assert!(!hit);
            assert!(!game_over);
            assert_eq!(next_seat, Seat::Two);
        }
        _ => unreachable!(),
    }

    // Bob hits a known ship cell on Alice's board; turn flips back.
    bob.send_move(0, 0, None);
    let msg = bob.wait_for("ShotFired", |m| {
        matches!(m, ServerMessage::ShotFired { seat: Seat::Two, .. })
    });
    match msg {
        ServerMessage::ShotFired {
            hit,
            next_seat,
            target_board,
            ..
        } => {
            assert!(hit);
            assert_eq!(next_seat, Seat::One);
            assert_eq!(target_board[0][0], Cell::Hit);
        }
        _ => unreachable!(),
    }

    // Alice sinks Bob's whole fleet, Bob burning turns on empty rows.
    let mut filler = (5u8..7).flat_map(|r| (0..9u8).map(move |c| (r, c)));
    let mut last_shot = None;
    for (row, size) in SHIP_SIZES.iter().enumerate() {
        for col in 0..*size {
            alice.send_move(row as u8, col, None);
            let msg = alice.wait_for("ShotFired", |m| {
                matches!(m, ServerMessage::ShotFired { seat: Seat::One, .. })
            });
            let game_over = matches!(msg, ServerMessage::ShotFired { game_over: true, .. });
            last_shot = Some(msg);
            if !game_over {
                let (r, c) = filler.next().expect("ran out of filler shots");
                bob.send_move(r, c, None);
                bob.wait_for("ShotFired", |m| {
                    matches!(m, ServerMessage::ShotFired { seat: Seat::Two, .. })
                });
            }
        }
    }

    match last_shot.expect("no shots fired") {
        ServerMessage::ShotFired {
            hit,
            game_over,
            next_seat,
            target_board,
            ..
        } => {
            assert!(hit);
            assert!(game_over, "final shot should end the game");
            // next_seat names the winner once the game is over.
            assert_eq!(next_seat, Seat::One);
            assert!(
                target_board
                    .iter()
                    .flatten()
                    .all(|&c| c != Cell::Ship),
                "every ship cell should be hit"
            );
        }
        _ => unreachable!(),
    }

    // The winner sees the same game-over event Bob does.
    bob.wait_for("final ShotFired", |m| {
        matches!(m, ServerMessage::ShotFired { game_over: true, .. })
    });

    // No moves are accepted after Finished.
    alice.send_move(6, 8, None);
    let msg = alice.wait_for("Error", |m| matches!(m, ServerMessage::Error { .. }));
    assert!(matches!(
        msg,
        ServerMessage::Error { message } if message == "no moves allowed in this phase"
    ));

    alice.disconnect();
    bob.disconnect();
    handle.stop();
}

#[test]
fn out_of_turn_moves_are_rejected() {
    let (handle, mut alice, mut bob) = start_match();

    // Bob tries to place while it's Alice's turn.
    bob.send_move(0, 0, Some(true));
    let msg = bob.wait_for("Error", |m| matches!(m, ServerMessage::Error { .. }));
    assert!(matches!(
        msg,
        ServerMessage::Error { message } if message == "not your turn"
    ));

    // Alice's turn was unaffected.
    alice.send_move(0, 0, Some(true));
    alice.wait_for("ShipPlaced", |m| {
        matches!(m, ServerMessage::ShipPlaced { seat: Seat::One, .. })
    });

    alice.disconnect();
    bob.disconnect();
    handle.stop();
}

#[test]
fn duplicate_shots_are_rejected() {
    let (handle, mut alice, mut bob) = start_match();
    place_fleet(&mut alice);
    place_fleet(&mut bob);
    alice.wait_for("BattleStart", |m| matches!(m, ServerMessage::BattleStart { .. }));

    // Alice misses at (6, 0); Bob misses at (6, 0) on Alice's board too.
    alice.send_move(6, 0, None);
    alice.wait_for("ShotFired", |m| {
        matches!(m, ServerMessage::ShotFired { seat: Seat::One, .. })
    });
    bob.send_move(6, 0, None);
    bob.wait_for("ShotFired", |m| {
        matches!(m, ServerMessage::ShotFired { seat: Seat::Two, .. })
    });

    // Alice re-targets her earlier miss.
    alice.send_move(6, 0, None);
    let msg = alice.wait_for("Error", |m| matches!(m, ServerMessage::Error { .. }));
    assert!(matches!(
        msg,
        ServerMessage::Error { message } if message == "already fired at this cell"
    ));

    // She is still on turn and can fire elsewhere.
    alice.send_move(6, 1, None);
    alice.wait_for("ShotFired", |m| {
        matches!(m, ServerMessage::ShotFired { seat: Seat::One, .. })
    });

    alice.disconnect();
    bob.disconnect();
    handle.stop();
}

#[test]
fn disconnect_notifies_and_frees_the_room() {
    let (handle, mut alice, mut bob) = start_match();

    bob.disconnect();
    let msg = alice.wait_for("PlayerLeft", |m| matches!(m, ServerMessage::PlayerLeft { .. }));
    assert!(matches!(
        msg,
        ServerMessage::PlayerLeft { seat: Seat::Two, .. }
    ));

    alice.disconnect();
    handle.stop();
}

#[test]
fn join_after_room_is_full_fails() {
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };
    let (handle, addr) = start_server(config).unwrap();
    thread::sleep(Duration::from_millis(50));

    let alice = TestPlayer::create(addr, "Alice");
    let _bob = TestPlayer::join(addr, alice.room_code(), "Bob");

    // GameClient::join_room surfaces the rejection as a handshake error.
    let err = broadside_server::client::GameClient::join_room(
        &addr.to_string(),
        alice.room_code(),
        "Carol",
    )
    .unwrap_err();
    assert!(err.contains("room is full"), "unexpected error: {err}");

    handle.stop();
}
