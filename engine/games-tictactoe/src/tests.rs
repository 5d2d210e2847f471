use super::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Play a sequence of actions from the initial board, alternating movers.
fn play(game: &TicTacToe, moves: &[usize]) -> (Board, Player) {
    let mut board = game.initial_board();
    let mut player = game.first_player();
    for &m in moves {
        let (next, next_player) = game.next_state(&board, player, m).unwrap();
        board = next;
        player = next_player;
    }
    (board, player)
}

#[test]
fn test_initial_state() {
    let game = TicTacToe::default();
    let board = game.initial_board();
    assert_eq!(board.cells(), &[0; 9]);
    assert_eq!(game.first_player(), Player::One);
    assert!(!game.is_terminal(&board, Player::One));
    assert_eq!(game.board_shape(), Ok((3, 3)));
}

#[test]
fn test_legal_moves() {
    let game = TicTacToe::default();
    let board = game.initial_board();
    assert_eq!(
        game.legal_actions(&board, Player::One),
        (0..9).collect::<Vec<_>>()
    );

    // After one move
    let (board, player) = play(&game, &[4]);
    let legal = game.legal_actions(&board, player);
    assert_eq!(legal.len(), 8);
    assert!(!legal.contains(&4));
    assert!(!game.is_legal(&board, player, 4));
    assert!(!game.is_legal(&board, player, 9));
}

#[test]
fn test_make_move() {
    let game = TicTacToe::default();
    let (board, player) = play(&game, &[4]);

    assert_eq!(board.cell(4), 1);
    assert_eq!(player, Player::Two);

    let (board, player) = game.next_state(&board, player, 0).unwrap();
    assert_eq!(board.cell(0), -1);
    assert_eq!(player, Player::One);
}

#[test]
fn test_invalid_move() {
    let game = TicTacToe::default();
    let (board, player) = play(&game, &[4]);

    assert_eq!(
        game.next_state(&board, player, 4),
        Err(GameError::IllegalAction {
            action: 4,
            player: Player::Two
        })
    );
    assert_eq!(
        game.next_state(&board, player, 9),
        Err(GameError::ActionOutOfRange { action: 9, size: 9 })
    );
}

#[test]
fn test_winning_game() {
    let game = TicTacToe::default();

    // X wins with top row
    let (board, player) = play(&game, &[0, 3, 1, 4, 2]);

    assert_eq!(game.judge(&board), Outcome::Win(Player::One));
    assert!(game.is_terminal(&board, player));
    assert_eq!(game.reward(&board, Player::One), 1.0);
    assert_eq!(game.reward(&board, Player::Two), -1.0);
}

#[test]
fn test_second_player_wins() {
    let game = TicTacToe::default();

    // O takes the anti-diagonal
    let (board, _) = play(&game, &[0, 2, 1, 4, 8, 6]);
    assert_eq!(game.judge(&board), Outcome::Win(Player::Two));
    assert_eq!(game.reward(&board, Player::Two), 1.0);
    assert_eq!(game.reward(&board, Player::One), -1.0);
}

#[test]
fn test_draw_game() {
    // Board: X O X / O X O / O X O
    let game = TicTacToe::default();
    let board = Board::from_cells(3, 3, vec![1, -1, 1, -1, 1, -1, -1, 1, -1]).unwrap();

    assert_eq!(game.judge(&board), Outcome::Draw);
    assert!(game.is_terminal(&board, Player::One));
    assert_eq!(game.reward(&board, Player::One), 0.0);
    assert_eq!(game.reward(&board, Player::Two), 0.0);
}

#[test]
fn test_canonical_form() {
    let game = TicTacToe::default();
    let (board, player) = play(&game, &[0, 4]);

    assert_eq!(player, Player::One);
    let canonical = game.canonical_form(&board, Player::Two);
    assert_eq!(canonical.cell(0), -1);
    assert_eq!(canonical.cell(4), 1);
    assert_eq!(game.canonical_form(&board, Player::One), board);
}

#[test]
fn test_metadata() {
    let meta = TicTacToe::default().metadata();
    assert_eq!(meta.env_id, "tictactoe");
    assert_eq!(meta.num_actions, 9);
    assert_eq!(meta.feature_size, 9);
    assert!(!meta.allows_pass);

    let meta = TicTacToe::new(4).metadata();
    assert_eq!(meta.env_id, "tictactoe4");
    assert_eq!(meta.num_actions, 16);
}

// =========================================================================
// Property tests for TicTacToe rules
// =========================================================================

/// Every row, column and diagonal should be detected for both players
#[test]
fn test_all_winning_lines() {
    for n in [3, 4, 5] {
        let game = TicTacToe::new(n);
        assert_eq!(game.lines.len(), 2 * n + 2);

        for line in &game.lines {
            let empty = game.initial_board();
            let x_board = empty.with_stones(line, 1);
            assert_eq!(
                game.judge(&x_board),
                Outcome::Win(Player::One),
                "X line {:?} not detected on {}x{}",
                line,
                n,
                n
            );

            let o_board = empty.with_stones(line, -1);
            assert_eq!(
                game.judge(&o_board),
                Outcome::Win(Player::Two),
                "O line {:?} not detected on {}x{}",
                line,
                n,
                n
            );
        }
    }
}

/// A line of n-1 stones is not a win
#[test]
fn test_partial_line_is_not_a_win() {
    let game = TicTacToe::new(4);
    let (board, _) = play(&game, &[0, 4, 1, 5, 2]);
    assert_eq!(game.judge(&board), Outcome::Ongoing);
}

/// Random playouts keep alternating, never exceed n*n moves and end with a
/// consistent reward
#[test]
fn test_random_games_invariants() {
    let game = TicTacToe::default();

    for seed in 0..100 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut board = game.initial_board();
        let mut player = game.first_player();
        let mut moves = 0;

        while !game.is_terminal(&board, player) {
            let legal = game.legal_actions(&board, player);
            assert!(!legal.is_empty(), "non-terminal without moves (seed={})", seed);

            let action = *legal.choose(&mut rng).unwrap();
            let (next, next_player) = game.next_state(&board, player, action).unwrap();
            assert_eq!(
                next_player,
                player.opponent(),
                "Player should switch after move (seed={})",
                seed
            );
            board = next;
            player = next_player;
            moves += 1;
        }

        assert!(moves <= 9, "Game should finish within 9 moves (seed={})", seed);
        let r1 = game.reward(&board, Player::One);
        let r2 = game.reward(&board, Player::Two);
        assert_eq!(r1, -r2, "Rewards should be zero-sum (seed={})", seed);
    }
}
