/*!

This is the long-form manual for `stv_tally` and the `stvtally` program.

## Counting rules

### Single transferable vote

The count follows these rules, in this order, for every round:

1. **Counting** every ballot that is not exhausted gives its current weight to
   the candidate it currently points at. Elected candidates keep the votes
   they held after their surplus was transferred (exactly the quota).
2. **Election** every hopeful candidate at or above the quota is elected,
   highest total first. Candidates with the same total are taken in order of
   identifier. No more candidates are elected than there are open seats.
   The count stops when all the seats are filled.
3. **Surplus transfer** for each candidate elected in the round, the votes
   above the quota move to the next hopeful choice of each of its ballots.
   Each ballot carries `surplus / total` of its weight.
4. **Elimination** when nobody was elected, the hopeful candidate with the
   fewest votes is eliminated (lowest identifier on a tie) and its ballots
   move to their next hopeful choice with their full weight.

The count also stops when no hopeful candidate is left. The remaining seats are
then reported as vacant: no winner is ever guessed.

The quota is the Droop quota `floor(V / (seats + 1)) + 1` with `V` the sum of
the weights of the valid ballots. With no valid ballot, the count does not
start and `QuotaUnreachable` is returned.

### Arithmetic

Votes are counted in micro-votes (one millionth of a vote) with integers only.
When a surplus is split, each ballot receives its share rounded down, and the
few micro-votes lost to rounding are handed out one by one to the ballots with
the largest remainders. Ties between remainders are settled by comparing the
rankings of the ballots. Hence:

- the surplus is transferred exactly, and the votes are always conserved:
  the totals of the candidates plus the exhausted weight add up to the number
  of votes cast, in every round;
- the result does not depend on the order in which the ballots were submitted.

### Flat weighted count

Each ballot gives `rank_weights[i]` points (times its weight) to the candidate
it ranks at position `i`. The default weights are `[3, 2, 1]`.

## Input format

`stvtally` reads an election described in JSON:

```text
{
  "contest": "Board election",
  "mode": "stv",
  "seats": 2,
  "candidates": [
    {"id": "A", "name": "Anna"},
    {"id": "B", "name": "Bob"}
  ],
  "ballots": [
    {"voter": "v1", "preferences": ["A", "B"]},
    {"voter": "v2", "preferences": ["B"], "weight": 3}
  ]
}
```

- `mode` is `stv` (default) or `flatWeighted`. The flat weighted count uses
  `rankWeights` (default `[3, 2, 1]`) and ignores `seats`.
- `voter` is optional. When present, it must be unique in the file.
- `weight` is optional and defaults to 1.

Ballots that do not pass the checks (empty, too long, unknown or repeated
candidate, zero weight) are listed in the summary under `rejectedBallots` and
are not counted.

## Output

The summary is a JSON document with the configuration, the standings and,
for STV, every round: the tally, who was elected or eliminated, and where the
votes went (`transfers`, including the exhausted weight). Vote amounts are
written as decimal strings with six digits (`"1.333334"`).

With `--reference`, the summary is compared with a previously produced one
and any difference is printed.

 */
