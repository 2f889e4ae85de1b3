// src/noyau/rpn.rs
//
// Shunting-yard -> RPN (postfix)
//
// Règles:
// - Num : sortie directe
// - Op  : dépile tant que le sommet est un opérateur de précédence plus forte,
//         ou égale si l’opérateur entrant est associatif à gauche ('^' est à droite)
// - '(' : empilée ; ')' : dépile jusqu’à '(' (jetée)
// - tolérant : ')' orpheline ignorée, '(' non fermée jetée en fin de pile

use super::jetons::Token;

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Num(2), Caret, Num(3), Caret, Num(2)]
///   rpn:    [Num(2), Num(3), Num(2), Caret, Caret]
pub fn to_rpn(tokens: &[Token]) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Token> = Vec::new();

    for tok in tokens.iter().cloned() {
        match tok {
            Token::Num(_) => out.push(tok),

            Token::Op(op) => {
                while let Some(Token::Op(top)) = ops.last() {
                    let p_top = top.precedence();
                    let p_tok = op.precedence();

                    let doit_pop = if op.is_right_associative() {
                        p_top > p_tok
                    } else {
                        p_top >= p_tok
                    };

                    if !doit_pop {
                        break;
                    }
                    if let Some(sorti) = ops.pop() {
                        out.push(sorti);
                    }
                }
                ops.push(tok);
            }

            Token::LPar => ops.push(tok),

            Token::RPar => {
                // dépile jusqu’à '(' ; si la pile se vide sans '(' : ')' orpheline, rien d’autre
                while let Some(top) = ops.pop() {
                    if matches!(top, Token::LPar) {
                        break;
                    }
                    out.push(top);
                }
            }
        }
    }

    // vide la pile ops (les '(' non fermées disparaissent)
    while let Some(op) = ops.pop() {
        if !matches!(op, Token::LPar) {
            out.push(op);
        }
    }

    out
}
